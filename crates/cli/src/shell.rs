//! Screen router and main loop.
//!
//! Each route maps to one screen. A screen runs until the user navigates away and returns the
//! next [`Navigation`]. The shell also watches the session: once it is signed out, whichever
//! screen comes next is replaced by the login screen.

use crate::console::{Console, Toast};
use crate::downloads::Downloads;
use crate::pages;
use api_client::{PharmApi, SessionState};
use pharm_core::Route;
use std::fmt::Display;
use std::io;
use tokio::sync::watch;

/// Where to go once a screen is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    To(Route),
    Quit,
}

pub struct Shell {
    pub(crate) api: PharmApi,
    pub(crate) console: Console,
    pub(crate) downloads: Downloads,
    session_events: watch::Receiver<SessionState>,
}

impl Shell {
    pub fn new(api: PharmApi, console: Console, downloads: Downloads) -> Self {
        let session_events = api.session().subscribe();
        Self {
            api,
            console,
            downloads,
            session_events,
        }
    }

    pub fn api(&self) -> &PharmApi {
        &self.api
    }

    /// First screen when no route was asked for.
    pub fn default_route(&self) -> Route {
        if self.api.session().is_signed_in() {
            Route::Dashboard
        } else {
            Route::Login
        }
    }

    /// Runs one screen.
    pub async fn show(&mut self, route: &Route) -> anyhow::Result<Navigation> {
        match route {
            Route::Login => pages::login::show(self).await,
            Route::Dashboard => pages::dashboard::show(self).await,
            Route::NewPatient => pages::patient_new::show(self).await,
            Route::Patient(id) => pages::patient_detail::show(self, id).await,
            Route::Questionnaire(id) => pages::questionnaire::show(self, id).await,
            Route::Summary(id) => pages::summary::show(self, id).await,
        }
    }

    /// Follows navigation from `start` until a screen quits or input ends.
    pub async fn run(&mut self, start: Route) -> anyhow::Result<()> {
        let mut route = start;
        loop {
            tracing::info!(route = %route, "opening screen");
            let next = self.show(&route).await?;
            match self.redirect_if_signed_out(next) {
                Navigation::To(next_route) => {
                    self.console.blank()?;
                    route = next_route;
                }
                Navigation::Quit => return Ok(()),
            }
        }
    }

    fn redirect_if_signed_out(&mut self, next: Navigation) -> Navigation {
        if !self.session_events.has_changed().unwrap_or(false) {
            return next;
        }
        let signed_in = self.session_events.borrow_and_update().is_signed_in();
        match next {
            Navigation::To(_) if !signed_in => {
                tracing::info!("session ended, returning to login");
                Navigation::To(Route::Login)
            }
            other => other,
        }
    }

    /// Logs a failed action and shows it as an error notification.
    pub(crate) fn report(&mut self, action: &str, err: impl Display) -> io::Result<()> {
        tracing::error!("{}: {}", action, err);
        self.console.notify(Toast::Error, format!("{action}: {err}"))
    }
}

/// Splits `"open 2"` into `("open", "2")`.
pub(crate) fn split_command(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (input, ""),
    }
}
