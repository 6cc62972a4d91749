//! Viewer identity, roles and role-scoped navigation
//!
//! Every place where sellers and buyers see something different goes through a
//! single `match` over [`Role`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of marketplace participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    #[default]
    Buyer,
}

impl Role {
    /// Parse a role name, `None` for anything but "seller"/"buyer"
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "seller" => Some(Role::Seller),
            "buyer" => Some(Role::Buyer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Buyer => "buyer",
        }
    }

    /// Sidebar entries for this role, in display order
    pub fn navigation(&self) -> Vec<NavItem> {
        let pages: &[Page] = match self {
            Role::Seller => &[
                Page::Dashboard,
                Page::AddListing,
                Page::Transactions,
                Page::Analytics,
                Page::Settings,
            ],
            Role::Buyer => &[
                Page::Dashboard,
                Page::Transactions,
                Page::Analytics,
                Page::Settings,
                Page::Marketplace,
            ],
        };
        pages.iter().map(|page| NavItem::new(*page)).collect()
    }

    /// Whether a signed-in user of this role may open `page`
    pub fn can_open(&self, page: Page) -> bool {
        match page {
            Page::AddListing => *self == Role::Seller,
            Page::Landing | Page::Login => false,
            _ => true,
        }
    }

    /// Dashboard and analytics variant for this role
    pub fn workspace(&self) -> Workspace {
        match self {
            Role::Seller => Workspace::Seller,
            Role::Buyer => Workspace::Buyer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Landing,
    Login,
    Dashboard,
    Marketplace,
    AddListing,
    Transactions,
    Analytics,
    Settings,
}

impl Page {
    pub fn label(&self) -> &'static str {
        match self {
            Page::Landing => "Home",
            Page::Login => "Sign In",
            Page::Dashboard => "Dashboard",
            Page::Marketplace => "Marketplace",
            Page::AddListing => "Add Listing",
            Page::Transactions => "Transactions",
            Page::Analytics => "Analytics",
            Page::Settings => "Settings",
        }
    }
}

/// One sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub page: Page,
    pub label: &'static str,
}

impl NavItem {
    fn new(page: Page) -> Self {
        Self {
            page,
            label: page.label(),
        }
    }
}

/// Role-specific dashboard/analytics descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Workspace {
    Seller,
    Buyer,
}

impl Workspace {
    pub fn title(&self) -> &'static str {
        match self {
            Workspace::Seller => "Seller Dashboard",
            Workspace::Buyer => "Buyer Dashboard",
        }
    }

    /// Analytics panels shown for this workspace
    pub fn panels(&self) -> &'static [&'static str] {
        match self {
            Workspace::Seller => &["projected-sales", "surplus-risk", "listing-performance"],
            Workspace::Buyer => &["market-demand", "spend-overview", "supplier-mix"],
        }
    }
}

/// The signed-in user as the application sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(rename = "userType")]
    pub user_type: Role,
}

impl User {
    /// Built-in demo identity for a role
    pub fn demo(role: Role) -> Self {
        let (name, company) = match role {
            Role::Seller => ("Demo Seller", "Demo Seller Company Ltd"),
            Role::Buyer => ("Demo Buyer", "Demo Buyer Corp"),
        };
        Self {
            name: name.to_string(),
            email: format!("demo-{}@rawsphere.com", role),
            company: company.to_string(),
            user_type: role,
        }
    }

    /// Identity used to scope transaction visibility
    pub fn viewer(&self) -> ViewerIdentity {
        ViewerIdentity {
            role: self.user_type,
            company_name: self.company.clone(),
        }
    }
}

/// Role and company name of the viewer.
///
/// Transaction visibility compares `company_name` against the record's party
/// text by substring. That is a display filter, not an access-control check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerIdentity {
    pub role: Role,
    #[serde(rename = "companyName")]
    pub company_name: String,
}

impl ViewerIdentity {
    pub fn new(role: Role, company_name: impl Into<String>) -> Self {
        Self {
            role,
            company_name: company_name.into(),
        }
    }
}
