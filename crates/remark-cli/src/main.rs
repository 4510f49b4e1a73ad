//! remark - comment store maintenance CLI
//!
//! Imports third-party comment exports and inspects stored sites.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default configuration
//! remark config init
//!
//! # Import a Disqus export
//! REMARK_SECRET=... remark import --site blog --file disqus-export.xml
//!
//! # Show the newest comments
//! remark last --site blog --max 5
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
