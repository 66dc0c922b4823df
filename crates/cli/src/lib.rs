//! # Pharm Assist terminal client
//!
//! The screens of the client rendered on a terminal, the router that moves between them and
//! the one-shot commands of the `pharm` binary.
//!
//! Screens never read the environment: [`settings`] resolves configuration and restores the
//! session once at startup and the result is handed to a [`shell::Shell`].

pub mod commands;
pub mod console;
pub mod downloads;
pub mod pages;
pub mod settings;
pub mod shell;

pub use console::{Console, Toast};
pub use downloads::Downloads;
pub use shell::{Navigation, Shell};
