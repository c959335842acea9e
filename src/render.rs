//! Server-side HTML rendering.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{AutoEscape, Environment, Value};
use serde::{Deserialize, Serialize};

use crate::directory::{BloodGroup, DonorRecord};
use crate::error::Error;

pub const CONTACT_PHONE: &str = "+91 9692402032 / 8260542544";
pub const CONTACT_PHONE_LINK: &str = "tel:+919692402032";
pub const CONTACT_EMAIL: &str = "yogdanofficial@gmail.com";

const DATE_FORMAT: &str = "%d %b %Y";

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("events.html", include_str!("../templates/events.html")),
    ("donors.html", include_str!("../templates/donors.html")),
    ("donors_grid.html", include_str!("../templates/donors_grid.html")),
    ("donors_list.html", include_str!("../templates/donors_list.html")),
    ("donor_contact.html", include_str!("../templates/donor_contact.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

/// Compiled page templates, shared by all handlers.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, Error> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

/// Wraps a rendered page, or logs the failure and answers 500.
pub fn respond(status: StatusCode, page: Result<String, Error>) -> Response {
    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

pub fn blood_group_options() -> Vec<&'static str> {
    BloodGroup::ALL.iter().map(|g| g.as_str()).collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    /// Unknown or missing values fall back to the grid.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("list") => ViewMode::List,
            _ => ViewMode::Grid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    fn template(self) -> &'static str {
        match self {
            ViewMode::Grid => "donors_grid.html",
            ViewMode::List => "donors_list.html",
        }
    }
}

/// Display fields of one donor card. Contact details are the site's
/// channel, never the donor's own.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DonorCard {
    pub id: String,
    pub name: String,
    pub blood_group: &'static str,
    pub address: String,
    pub contact_phone: &'static str,
    pub contact_email: &'static str,
    pub member_since: String,
    pub last_donation: String,
}

impl From<&DonorRecord> for DonorCard {
    fn from(donor: &DonorRecord) -> Self {
        let last_donation = match donor.last_donation {
            Some(date) => format!("Last donated: {}", date.format(DATE_FORMAT)),
            None => "No previous donations".to_string(),
        };
        Self {
            id: donor.id.clone(),
            name: donor.name.clone(),
            blood_group: donor.blood_group.as_str(),
            address: donor.address.clone(),
            contact_phone: CONTACT_PHONE,
            contact_email: CONTACT_EMAIL,
            member_since: format!("Member since {}", donor.created_at.format(DATE_FORMAT)),
            last_donation,
        }
    }
}

/// Renders the visible donors in the chosen layout. Output depends only on
/// the donors given and the mode.
pub fn render_donor_cards(
    templates: &Templates,
    donors: &[&DonorRecord],
    mode: ViewMode,
) -> Result<String, Error> {
    let cards: Vec<DonorCard> = donors.iter().map(|d| DonorCard::from(*d)).collect();
    templates.render(mode.template(), minijinja::context! { donors => cards })
}

/// Marks already-escaped markup for embedding in a page.
pub fn trusted(html: String) -> Value {
    Value::from_safe_string(html)
}
