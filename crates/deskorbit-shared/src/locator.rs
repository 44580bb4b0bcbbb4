//! Resolves the desktop's icon list view
//!
//! Explorer hosts the list view under `Progman > SHELLDLL_DefView`, except
//! after the wallpaper host has been split off, when `SHELLDLL_DefView`
//! moves under one of the top-level `WorkerW` windows.

use std::cell::Cell;

use crate::shell::{Shell, WindowHandle};

const PROGMAN_CLASS: &str = "Progman";
const WORKERW_CLASS: &str = "WorkerW";
const DEFVIEW_CLASS: &str = "SHELLDLL_DefView";
const LISTVIEW_CLASS: &str = "SysListView32";

/// Whether a successful lookup is kept between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocatorPolicy {
    /// Walk the window tree on every call
    #[default]
    PerCall,
    /// Keep the first successful result until [`IconLocator::invalidate`]
    Session,
}

/// Idempotent lookup of the icon container
#[derive(Debug, Default)]
pub struct IconLocator {
    policy: LocatorPolicy,
    cached: Cell<Option<WindowHandle>>,
}

impl IconLocator {
    /// Create a locator with the given caching policy
    pub fn new(policy: LocatorPolicy) -> Self {
        Self {
            policy,
            cached: Cell::new(None),
        }
    }

    /// Find the icon container, or `None` if the shell isn't in the expected shape
    pub fn resolve<S: Shell + ?Sized>(&self, shell: &S) -> Option<WindowHandle> {
        if let Some(handle) = self.cached.get() {
            return Some(handle);
        }

        let found = locate_icon_container(shell);
        if self.policy == LocatorPolicy::Session && found.is_some() {
            self.cached.set(found);
        }
        found
    }

    /// Forget a cached result
    pub fn invalidate(&self) {
        self.cached.set(None);
    }
}

/// Walk the shell's window tree for the icon list view
pub fn locate_icon_container<S: Shell + ?Sized>(shell: &S) -> Option<WindowHandle> {
    let defview = shell
        .find_window(None, None, PROGMAN_CLASS)
        .and_then(|progman| shell.find_window(Some(progman), None, DEFVIEW_CLASS))
        .or_else(|| find_defview_in_workers(shell))?;

    let listview = shell.find_window(Some(defview), None, LISTVIEW_CLASS);
    log::debug!("Icon container: {:?} (DefView {:?})", listview, defview);
    listview
}

fn find_defview_in_workers<S: Shell + ?Sized>(shell: &S) -> Option<WindowHandle> {
    let mut worker = shell.find_window(None, None, WORKERW_CLASS);
    while let Some(current) = worker {
        if let Some(defview) = shell.find_window(Some(current), None, DEFVIEW_CLASS) {
            log::debug!("SHELLDLL_DefView found under WorkerW {:?}", current);
            return Some(defview);
        }
        worker = shell.find_window(None, Some(current), WORKERW_CLASS);
    }
    None
}
