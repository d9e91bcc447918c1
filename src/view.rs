//! View state shared by the resource pages.
//!
//! A page is in exactly one [`ViewMode`]; its list lives in a [`Listing`]
//! guarded by a [`Mount`] flag so that responses arriving after the page
//! is gone are dropped instead of applied.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error};

use crate::api_models::Paginated;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode<T> {
    List,
    Create,
    Edit(T),
    Detail(T),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} from the {from} view")]
pub struct ViewError {
    pub from: &'static str,
    pub action: &'static str,
}

impl<T> Default for ViewMode<T> {
    fn default() -> Self {
        ViewMode::List
    }
}

impl<T: Clone> ViewMode<T> {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Create => "create",
            ViewMode::Edit(_) => "edit",
            ViewMode::Detail(_) => "detail",
        }
    }

    pub fn selected(&self) -> Option<&T> {
        match self {
            ViewMode::Edit(e) | ViewMode::Detail(e) => Some(e),
            ViewMode::List | ViewMode::Create => None,
        }
    }

    fn refuse(&self, action: &'static str) -> Result<(), ViewError> {
        Err(ViewError {
            from: self.name(),
            action,
        })
    }

    pub fn open_create(&mut self) -> Result<(), ViewError> {
        match self {
            ViewMode::List => {
                *self = ViewMode::Create;
                Ok(())
            }
            _ => self.refuse("create"),
        }
    }

    pub fn open_detail(&mut self, entity: T) -> Result<(), ViewError> {
        match self {
            ViewMode::List => {
                *self = ViewMode::Detail(entity);
                Ok(())
            }
            _ => self.refuse("view"),
        }
    }

    /// Edit straight from a list row.
    pub fn open_edit(&mut self, entity: T) -> Result<(), ViewError> {
        match self {
            ViewMode::List | ViewMode::Detail(_) => {
                *self = ViewMode::Edit(entity);
                Ok(())
            }
            _ => self.refuse("edit"),
        }
    }

    /// Edit the entity currently shown in detail.
    pub fn edit_selected(&mut self) -> Result<(), ViewError> {
        match self {
            ViewMode::Detail(entity) => {
                let entity = entity.clone();
                *self = ViewMode::Edit(entity);
                Ok(())
            }
            _ => self.refuse("edit"),
        }
    }

    pub fn cancel(&mut self) {
        *self = ViewMode::List;
    }

    /// A create or edit went through; back to the list.
    pub fn submitted(&mut self) -> Result<(), ViewError> {
        match self {
            ViewMode::Create | ViewMode::Edit(_) => {
                *self = ViewMode::List;
                Ok(())
            }
            _ => self.refuse("submit"),
        }
    }
}

/// Liveness flag for a page. Clones share it.
#[derive(Debug, Clone)]
pub struct Mount(Arc<AtomicBool>);

impl Default for Mount {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Mount {
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T, F> {
    pub items: Vec<T>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub filter: F,
    pub error: Option<String>,
    in_flight: usize,
}

impl<T, F> ListState<T, F> {
    pub fn new(filter: F) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            next: None,
            previous: None,
            filter,
            error: None,
            in_flight: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// A page's result set plus its current filter.
///
/// Overlapping fetches are not cancelled: whichever response resolves last
/// is what the list shows.
pub struct Listing<T, F> {
    state: Mutex<ListState<T, F>>,
    mount: Mount,
}

impl<T: Clone, F: Clone + PartialEq> Listing<T, F> {
    pub fn new(filter: F, mount: Mount) -> Self {
        Self {
            state: Mutex::new(ListState::new(filter)),
            mount,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState<T, F>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ListState<T, F> {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn filter(&self) -> F {
        self.lock().filter.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    /// Edit the filter; true when it actually changed and a re-fetch is due.
    pub fn update_filter(&self, edit: impl FnOnce(&mut F)) -> bool {
        let mut state = self.lock();
        let before = state.filter.clone();
        edit(&mut state.filter);
        state.filter != before
    }

    /// Fetch with the current filter and apply the outcome, unless the
    /// page was unmounted in the meantime.
    pub async fn refresh<Fut>(
        &self,
        fetch: impl FnOnce(F) -> Fut,
        failure: &str,
    ) -> Result<(), ApiError>
    where
        Fut: Future<Output = Result<Paginated<T>, ApiError>>,
    {
        let filter = {
            let mut state = self.lock();
            state.in_flight += 1;
            state.filter.clone()
        };

        let result = fetch(filter).await;

        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if !self.mount.is_mounted() {
            debug!("page unmounted, discarding list response");
            return result.map(|_| ());
        }
        match result {
            Ok(page) => {
                state.items = page.results;
                state.count = page.count;
                state.next = page.next;
                state.previous = page.previous;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "{}", failure);
                state.error = Some(failure.to_string());
                Err(e)
            }
        }
    }
}

/// Lock a page's view mode, recovering from poisoning.
pub(crate) fn lock_view<T>(view: &Mutex<ViewMode<T>>) -> MutexGuard<'_, ViewMode<T>> {
    view.lock().unwrap_or_else(|e| e.into_inner())
}
