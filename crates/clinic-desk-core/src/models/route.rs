//! Application routes and the navigation seam.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Pages of the desk application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    NewVisit,
    Patients,
    Manage,
}

impl Route {
    /// Cards shown on the home page, in display order.
    pub const CARDS: [Route; 3] = [Route::NewVisit, Route::Patients, Route::Manage];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::NewVisit => "/new",
            Route::Patients => "/patients",
            Route::Manage => "/manage",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Home),
            "/new" => Some(Route::NewVisit),
            "/patients" => Some(Route::Patients),
            "/manage" => Some(Route::Manage),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "ClinicDesk",
            Route::NewVisit => "New Visit",
            Route::Patients => "Patients",
            Route::Manage => "Manage Clinic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Route::Home => "Patient records & visit management",
            Route::NewVisit => "Record a new patient consultation, diagnosis, and prescription.",
            Route::Patients => "View, search, and manage saved patient records.",
            Route::Manage => "Control your data, backups, and clinic preferences.",
        }
    }
}

/// Navigation seam. The shell's router implements this.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct History {
    visited: Mutex<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.visited
            .lock()
            .ok()
            .and_then(|visited| visited.last().copied())
    }

    pub fn visited(&self) -> Vec<Route> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(route);
        }
    }
}
