//! Application state host
//!
//! [`MarketHost`] is the single owner of mutable application state: the
//! current user, the current page and the record stores. Transport layers
//! (the REST router here) call its entry points and never touch the state
//! directly. Every view is computed on demand from the current snapshot, so a
//! new listing is visible to the next query without any invalidation step.

use crate::config::MarketConfig;
use crate::core::auth::{AuthEvent, AuthProvider, SignInRequest, SignUpRequest};
use crate::core::engine::{QueryView, run_query};
use crate::core::error::{MarketError, MarketResult, RequestError};
use crate::core::events::{EventBus, MarketEvent};
use crate::core::forecast::ForecastSource;
use crate::core::listing::{Listing, ListingCard, ListingDraft, ListingSort};
use crate::core::query::{ListingQueryParams, RecordQuery, TransactionQueryParams};
use crate::core::record::Record;
use crate::core::store::RecordStore;
use crate::core::transaction::{Transaction, TransactionSort};
use crate::core::user::{NavItem, Page, Role, User, Workspace};
use crate::storage::ListingIdGenerator;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use validator::Validate;

#[derive(Debug, Default)]
struct HostState {
    current_user: Option<User>,
    page: Page,
}

/// Current user, page and sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub user: Option<User>,
    pub page: Page,
    pub navigation: Vec<NavItem>,
}

/// Role-specific dashboard description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceView {
    pub workspace: Workspace,
    pub title: &'static str,
    pub panels: &'static [&'static str],
    pub user: User,
}

/// A transaction together with the hash shown in its detail dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub display_hash: String,
}

/// Application state and its entry points
pub struct MarketHost {
    config: MarketConfig,
    state: RwLock<HostState>,
    listings: Arc<dyn RecordStore<Listing>>,
    transactions: Arc<dyn RecordStore<Transaction>>,
    listing_ids: ListingIdGenerator,
    auth: Arc<dyn AuthProvider>,
    forecast: Arc<dyn ForecastSource>,
    event_bus: EventBus,
}

impl MarketHost {
    pub fn new(
        config: MarketConfig,
        listings: Arc<dyn RecordStore<Listing>>,
        transactions: Arc<dyn RecordStore<Transaction>>,
        auth: Arc<dyn AuthProvider>,
        forecast: Arc<dyn ForecastSource>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(HostState::default()),
            listings,
            transactions,
            listing_ids: ListingIdGenerator::new(),
            auth,
            forecast,
            event_bus,
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn forecast(&self) -> &Arc<dyn ForecastSource> {
        &self.forecast
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    fn read_state<R>(&self, f: impl FnOnce(&HostState) -> R) -> MarketResult<R> {
        let state = self
            .state
            .read()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire state lock: {}", e)))?;
        Ok(f(&state))
    }

    fn write_state<R>(&self, f: impl FnOnce(&mut HostState) -> R) -> MarketResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|e| MarketError::Internal(format!("Failed to acquire state lock: {}", e)))?;
        Ok(f(&mut state))
    }

    pub fn current_user(&self) -> MarketResult<Option<User>> {
        self.read_state(|s| s.current_user.clone())
    }

    pub fn current_page(&self) -> MarketResult<Page> {
        self.read_state(|s| s.page)
    }

    fn require_user(&self) -> MarketResult<User> {
        self.current_user()?.ok_or_else(|| {
            RequestError::Unauthorized {
                message: "Sign in first".to_string(),
            }
            .into()
        })
    }

    /// Current user, page and the sidebar for the user's role
    pub fn session(&self) -> MarketResult<SessionView> {
        self.read_state(|s| SessionView {
            user: s.current_user.clone(),
            page: s.page,
            navigation: s
                .current_user
                .as_ref()
                .map(|u| u.user_type.navigation())
                .unwrap_or_default(),
        })
    }

    fn start_session(&self, user: User) -> MarketResult<User> {
        self.write_state(|s| {
            s.current_user = Some(user.clone());
            s.page = Page::Dashboard;
        })?;
        tracing::info!(email = %user.email, role = %user.user_type, "session started");
        self.event_bus.publish(MarketEvent::SessionStarted { user: user.clone() });
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Session entry points
    // ------------------------------------------------------------------

    /// Sign in; the role chosen on the form decides the workspace
    pub async fn sign_in(&self, request: SignInRequest) -> MarketResult<User> {
        let account = self.auth.sign_in(&request.email, &request.password).await?;
        self.start_session(User::from_auth(&account, Some(request.user_type)))
    }

    /// Create an account and sign it in
    pub async fn sign_up(&self, request: SignUpRequest) -> MarketResult<User> {
        request.validate()?;
        let account = self
            .auth
            .sign_up(&request.email, &request.password, request.metadata())
            .await?;
        self.start_session(User::from_auth(&account, None))
    }

    /// Sign in as the built-in demo user of `role`, bypassing the auth service
    pub fn demo_login(&self, role: Role) -> MarketResult<User> {
        self.start_session(User::demo(role))
    }

    /// Adopt the identity service's existing session, if any
    pub async fn restore_session(&self) -> MarketResult<Option<User>> {
        let Some(session) = self.auth.current_session().await? else {
            return Ok(None);
        };
        self.start_session(User::from_auth(&session.user, None))
            .map(Some)
    }

    /// Sign out and return to the landing page
    pub async fn logout(&self) -> MarketResult<()> {
        self.auth.sign_out().await?;
        self.end_session()
    }

    fn end_session(&self) -> MarketResult<()> {
        let previous = self.write_state(|s| {
            s.page = Page::Landing;
            s.current_user.take()
        })?;
        if let Some(user) = previous {
            tracing::info!(email = %user.email, "session ended");
            self.event_bus.publish(MarketEvent::SessionEnded { email: user.email });
        }
        Ok(())
    }

    /// Follow auth state changes pushed by the identity service.
    ///
    /// Events can arrive after the state they describe has been superseded,
    /// so each one is checked against the provider's current session before
    /// it is applied. A sign-in is adopted only while its session is still
    /// the live one and no user is current, so the role picked on the
    /// sign-in form is never overwritten by the stored one. A sign-out ends
    /// the session only while the provider has no session. The task stops
    /// once the host is dropped or the provider closes its channel.
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.auth.subscribe();
        let host: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth listener lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(host) = host.upgrade() else {
                    break;
                };
                if let Err(e) = host.apply_auth_event(event).await {
                    tracing::warn!(error = %e, "failed to apply auth event");
                }
            }
        })
    }

    async fn apply_auth_event(&self, event: AuthEvent) -> MarketResult<()> {
        let live = self.auth.current_session().await?;
        match event {
            AuthEvent::SignedIn(session) => {
                let is_live = live
                    .as_ref()
                    .is_some_and(|current| current.access_token == session.access_token);
                if !is_live {
                    tracing::debug!("ignoring superseded sign-in event");
                    return Ok(());
                }
                let user = User::from_auth(&session.user, None);
                let adopted = self.write_state(|s| {
                    if s.current_user.is_some() {
                        return false;
                    }
                    s.current_user = Some(user.clone());
                    s.page = Page::Dashboard;
                    true
                })?;
                if adopted {
                    tracing::info!(email = %user.email, "session adopted from identity service");
                    self.event_bus.publish(MarketEvent::SessionStarted { user });
                }
                Ok(())
            }
            AuthEvent::SignedOut if live.is_some() => {
                tracing::debug!("ignoring superseded sign-out event");
                Ok(())
            }
            AuthEvent::SignedOut => self.end_session(),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Sidebar entries for the signed-in user
    pub fn navigation(&self) -> MarketResult<Vec<NavItem>> {
        Ok(self.require_user()?.user_type.navigation())
    }

    /// Change the current page.
    ///
    /// Signed out, only the landing and login pages are reachable. Signed in,
    /// the role decides.
    pub fn navigate(&self, page: Page) -> MarketResult<Page> {
        match self.current_user()? {
            None if matches!(page, Page::Landing | Page::Login) => {}
            None => {
                return Err(RequestError::Unauthorized {
                    message: format!("Sign in to open {}", page.label()),
                }
                .into());
            }
            Some(user) if user.user_type.can_open(page) => {}
            Some(user) => {
                return Err(RequestError::Forbidden {
                    message: format!("A {} cannot open {}", user.user_type, page.label()),
                }
                .into());
            }
        }

        self.write_state(|s| s.page = page)?;
        self.event_bus.publish(MarketEvent::PageChanged { page });
        Ok(page)
    }

    /// Dashboard and analytics variant for the signed-in user
    pub fn workspace(&self) -> MarketResult<WorkspaceView> {
        let user = self.require_user()?;
        let workspace = user.user_type.workspace();
        Ok(WorkspaceView {
            workspace,
            title: workspace.title(),
            panels: workspace.panels(),
            user,
        })
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Validate a seller's draft and put the new listing first in the catalog
    pub async fn add_listing(&self, draft: ListingDraft) -> MarketResult<Listing> {
        let user = self.require_user()?;
        if user.user_type != Role::Seller {
            return Err(RequestError::Forbidden {
                message: "Only sellers can list surplus".to_string(),
            }
            .into());
        }

        let listing = draft.into_listing(self.listing_ids.next_id(), Some(&user.company))?;
        let listing = self.listings.prepend(listing).await?;

        tracing::info!(
            id = %listing.id,
            seller = %listing.seller,
            category = listing.category.as_str(),
            "listing added"
        );
        self.event_bus.publish(MarketEvent::ListingAdded {
            listing_id: listing.id.clone(),
            name: listing.name.clone(),
            seller: listing.seller.clone(),
        });
        Ok(listing)
    }

    /// Marketplace view. Listings are visible to everyone.
    pub async fn listings_view(
        &self,
        params: &ListingQueryParams,
    ) -> MarketResult<QueryView<Listing>> {
        let query: RecordQuery<ListingSort> = params.to_query();
        let snapshot = self.listings.snapshot().await?;
        Ok(QueryView::evaluate(&snapshot, &query))
    }

    /// Expiry badges for listings, relative to `today`
    pub fn listing_cards(&self, listings: Vec<Listing>, today: NaiveDate) -> Vec<ListingCard> {
        listings
            .into_iter()
            .map(|l| ListingCard::new(l, today, self.config.expiry_warning_days))
            .collect()
    }

    /// Expiry badges relative to the current UTC date
    pub fn listing_cards_today(&self, listings: Vec<Listing>) -> Vec<ListingCard> {
        self.listing_cards(listings, Utc::now().date_naive())
    }

    /// Transactions the signed-in user is a party to
    pub async fn transactions_view(
        &self,
        params: &TransactionQueryParams,
    ) -> MarketResult<QueryView<Transaction>> {
        let user = self.require_user()?;
        let query: RecordQuery<TransactionSort> = params.to_query().viewer(user.viewer());
        let snapshot = self.transactions.snapshot().await?;
        Ok(QueryView::evaluate(&snapshot, &query))
    }

    /// One transaction with its display hash.
    ///
    /// Rows outside the user's view are reported as missing.
    pub async fn transaction_detail(&self, id: &str) -> MarketResult<TransactionDetail> {
        let user = self.require_user()?;
        let not_found = || MarketError::not_found(Transaction::resource_name_singular(), id);

        let transaction = self.transactions.get(id).await?.ok_or_else(not_found)?;
        let visible = RecordQuery::<TransactionSort>::new().viewer(user.viewer());
        if run_query(std::slice::from_ref(&transaction), &visible).is_empty() {
            return Err(not_found());
        }

        Ok(TransactionDetail {
            display_hash: transaction.display_hash(),
            transaction,
        })
    }
}
