// Activity log page controller

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::api;
use crate::api_models::{ActivityLogQuery, UserQuery};
use crate::error::{ApiError, ConsoleError, Result};
use crate::handlers::{non_empty, report};
use crate::middleware::ConsoleState;
use crate::models::{ActivityLog, User};
use crate::view::{Listing, Mount};

pub const LOAD_FAILED: &str = "Failed to load activity logs";

pub struct LogsPage {
    state: ConsoleState,
    mount: Mount,
    list: Listing<ActivityLog, ActivityLogQuery>,
    /// Operators offered in the user filter.
    users: Mutex<Vec<User>>,
}

impl LogsPage {
    pub fn new(state: ConsoleState) -> Self {
        let mount = Mount::default();
        Self {
            state,
            list: Listing::new(ActivityLogQuery::default(), mount.clone()),
            mount,
            users: Mutex::new(Vec::new()),
        }
    }

    pub fn listing(&self) -> &Listing<ActivityLog, ActivityLogQuery> {
        &self.list
    }

    pub fn logs(&self) -> Vec<ActivityLog> {
        self.list.items()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Logs and the user list are fetched together; either failing fails
    /// the load.
    pub async fn load(&self) -> Result<()> {
        let client = self.state.client.clone();
        let mount = self.mount.clone();
        let users = &self.users;
        self.list
            .refresh(
                move |query| async move {
                    let everyone = UserQuery::default();
                    let (logs, people) = futures::try_join!(
                        api::activity_logs::list(&client, &query),
                        api::users::list(&client, &everyone),
                    )?;
                    if mount.is_mounted() {
                        *users.lock().unwrap_or_else(|e| e.into_inner()) = people.results;
                    }
                    Ok::<_, ApiError>(logs)
                },
                LOAD_FAILED,
            )
            .await?;
        Ok(())
    }

    pub async fn search(&self, term: &str) -> Result<()> {
        if self.list.update_filter(|q| q.search = non_empty(term)) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_user(&self, user: Option<i64>) -> Result<()> {
        if self.list.update_filter(|q| q.user = user) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_action(&self, action: &str) -> Result<()> {
        if self.list.update_filter(|q| q.action = non_empty(action)) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_target_type(&self, target_type: &str) -> Result<()> {
        if self.list.update_filter(|q| q.target_type = non_empty(target_type)) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ConsoleError::InvalidInput(
                    "start date is after end date".to_string(),
                ));
            }
        }
        if self.list.update_filter(|q| {
            q.start_date = start;
            q.end_date = end;
        }) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn detail(&self, id: i64) -> Result<ActivityLog> {
        api::activity_logs::get(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load activity log"))
    }
}
