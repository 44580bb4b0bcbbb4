//! deskorbit CLI - spins the desktop icons around a planet on the wallpaper

mod logger;

use clap::{Parser, Subcommand};
use colored::Colorize;
use deskorbit_shared::{
    IconLocator, IconRegistry, LocatorPolicy, Orbit, OrbitGeometry, Shell, SpeedMode,
    SpeedProfile,
};

#[derive(Parser)]
#[command(name = "deskorbit")]
#[command(about = "Desktop icons orbiting a planet - run without arguments to animate")]
#[command(version)]
struct Args {
    /// Show debug output (window lookups, remote buffers)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
#[cfg_attr(not(windows), allow(dead_code))]
enum Command {
    /// Animate the icons around the planet (the default)
    Animate {
        /// Rotate at a constant speed, ignoring the mouse
        #[arg(long)]
        steady: bool,
    },
    /// List every icon with its label and position
    List,
    /// Show the mouse position relative to an icon
    Cursor {
        /// Icon index
        index: usize,
    },
    /// Move a single icon (list view client coordinates)
    Move {
        /// Icon index
        index: usize,
        /// Horizontal position
        #[arg(allow_hyphen_values = true)]
        x: i32,
        /// Vertical position
        #[arg(allow_hyphen_values = true)]
        y: i32,
    },
}

fn main() {
    let args = Args::parse();
    logger::init(args.verbose);

    print_banner();

    let command = args.command.unwrap_or(Command::Animate { steady: false });

    #[cfg(windows)]
    {
        deskorbit_shared::win32::enable_dpi_awareness();
        std::process::exit(run(deskorbit_shared::win32::Win32Shell, command));
    }

    #[cfg(not(windows))]
    {
        let _ = command;
        eprintln!(
            "{} deskorbit drives the Windows desktop and can't run on this platform",
            "[ERROR]".red()
        );
        std::process::exit(1);
    }
}

fn print_banner() {
    println!();
    println!("{}", "DESKORBIT".cyan().bold());
    println!("{}", "Desktop icons in orbit".white());
    println!();
}

/// Run a command against `shell`, returning the process exit code
#[cfg_attr(not(windows), allow(dead_code))]
fn run<S: Shell>(shell: S, command: Command) -> i32 {
    let icons = IconRegistry::with_locator(shell, IconLocator::new(LocatorPolicy::Session));
    match command {
        Command::Animate { steady } => animate(&icons, steady),
        Command::List => list_icons(&icons),
        Command::Cursor { index } => show_cursor(&icons, index),
        Command::Move { index, x, y } => move_icon(&icons, index, x, y),
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn animate<S: Shell>(icons: &IconRegistry<S>, steady: bool) -> i32 {
    if !icons.disable_snap_to_grid() {
        eprintln!("{} Error disabling snap to grid", "[ERROR]".red());
        return 1;
    }
    println!("{} Snap to grid disabled", "[OK]".green());

    let mode = if steady {
        SpeedMode::Steady
    } else {
        SpeedMode::Mouse
    };

    let mut orbit = match Orbit::new(icons, OrbitGeometry::default(), SpeedProfile::default(), mode)
    {
        Ok(orbit) => orbit,
        Err(e) => {
            eprintln!("{} Invalid orbit: {}", "[ERROR]".red(), e);
            return 1;
        }
    };

    match orbit.run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} Animation stopped: {}", "[ERROR]".red(), e);
            1
        }
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn list_icons<S: Shell>(icons: &IconRegistry<S>) -> i32 {
    let labels = match icons.labels() {
        Ok(labels) => labels,
        Err(e) => {
            eprintln!("{} Failed to list icons: {}", "[ERROR]".red(), e);
            return 1;
        }
    };

    if labels.is_empty() {
        println!("{} No icons", "[WARN]".yellow());
        return 0;
    }

    println!(
        "{:<6} {:<40} {}",
        "Index".cyan().bold(),
        "Label".cyan().bold(),
        "Position".cyan().bold(),
    );
    println!("{}", "-".repeat(70));

    for (index, label) in labels {
        match icons.position(index) {
            Ok(pos) => println!("{:<6} {:<40} ({}, {})", index, label, pos.x, pos.y),
            Err(e) => println!("{:<6} {:<40} {}", index, label, e.to_string().red()),
        }
    }
    0
}

#[cfg_attr(not(windows), allow(dead_code))]
fn show_cursor<S: Shell>(icons: &IconRegistry<S>, index: usize) -> i32 {
    match icons.cursor_relative_to(index) {
        Ok(report) => {
            println!(
                "{} Mouse (screen): ({}, {})",
                "[INFO]".blue(),
                report.mouse_screen.x,
                report.mouse_screen.y
            );
            println!(
                "{} Mouse (client): ({}, {})",
                "[INFO]".blue(),
                report.mouse_client.x,
                report.mouse_client.y
            );
            println!(
                "{} Icon {} (client): ({}, {})",
                "[INFO]".blue(),
                index,
                report.icon_client.x,
                report.icon_client.y
            );
            println!(
                "{} Delta: ({}, {})",
                "[OK]".green(),
                report.delta.x,
                report.delta.y
            );
            0
        }
        Err(e) => {
            eprintln!("{} Failed to locate icon {}: {}", "[ERROR]".red(), index, e);
            1
        }
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn move_icon<S: Shell>(icons: &IconRegistry<S>, index: usize, x: i32, y: i32) -> i32 {
    if i16::try_from(x).is_err() || i16::try_from(y).is_err() {
        eprintln!(
            "{} ({}, {}) is outside the 16-bit coordinate range",
            "[ERROR]".red(),
            x,
            y
        );
        return 1;
    }

    let count = match icons.count() {
        Ok(count) => count,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red(), e);
            return 1;
        }
    };
    if index >= count {
        eprintln!(
            "{} Index {} out of range ({} icons)",
            "[ERROR]".red(),
            index,
            count
        );
        return 1;
    }

    match icons.set_position(index, x, y) {
        Ok(()) => {
            println!("{} Icon {} moved to ({}, {})", "[OK]".green(), index, x, y);
            0
        }
        Err(e) => {
            eprintln!("{} Failed to move icon {}: {}", "[ERROR]".red(), index, e);
            1
        }
    }
}
