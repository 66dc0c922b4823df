//! Client route table.
//!
//! Six paths, each mapped to one screen. There are no guards: any screen can be opened
//! directly, and one that needs a session simply gets an error from the API.

use crate::error::RouteError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/paciente/novo`
    NewPatient,
    /// `/paciente/:id`
    Patient(String),
    /// `/atendimento/iniciar/:id`, with an encounter id.
    Questionnaire(String),
    /// `/atendimento/resumo/:id`, with an encounter id.
    Summary(String),
}

impl Route {
    pub fn parse(path: &str) -> Result<Route, RouteError> {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Route::Login),
            ["dashboard"] => Ok(Route::Dashboard),
            ["paciente", "novo"] => Ok(Route::NewPatient),
            ["paciente", id] => Ok(Route::Patient((*id).to_string())),
            ["atendimento", "iniciar", id] => Ok(Route::Questionnaire((*id).to_string())),
            ["atendimento", "resumo", id] => Ok(Route::Summary((*id).to_string())),
            ["paciente"] | ["atendimento", "iniciar"] | ["atendimento", "resumo"] => {
                Err(RouteError::MissingId(trimmed.to_string()))
            }
            _ => Err(RouteError::UnknownPath(trimmed.to_string())),
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str("/"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::NewPatient => f.write_str("/paciente/novo"),
            Route::Patient(id) => write!(f, "/paciente/{id}"),
            Route::Questionnaire(id) => write!(f, "/atendimento/iniciar/{id}"),
            Route::Summary(id) => write!(f, "/atendimento/resumo/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}
