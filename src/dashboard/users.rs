// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Users container: pagination, sorting, search and the activation toggle.

use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{PaginateRequest, SortDirection, UserPage, UserRecord};
use crate::services::Gateway;

/// Query parameters plus the last-known page.
#[derive(Debug, Clone, Default)]
struct UsersView {
    page: UserPage,
    paginate: PaginateRequest,
    search_term: Option<String>,
}

/// Last-known user page for the user-management view.
pub struct UsersContainer {
    gateway: Gateway,
    view: RwLock<UsersView>,
}

impl UsersContainer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            view: RwLock::new(UsersView::default()),
        }
    }

    /// Refetch the page with the current parameters. A no-data response
    /// keeps the last-known page.
    pub async fn refresh(&self) -> Result<()> {
        let (paginate, search_term) = {
            let view = self.view.read().await;
            (view.paginate.clone(), view.search_term.clone())
        };

        if let Some(page) = self.gateway.users(&paginate, search_term.as_deref()).await? {
            self.view.write().await.page = page;
        }
        Ok(())
    }

    /// Current page snapshot.
    pub async fn page(&self) -> UserPage {
        self.view.read().await.page.clone()
    }

    /// Jump to a page.
    pub async fn set_page(&self, page: u32) -> Result<()> {
        self.view.write().await.paginate.page = page;
        self.refresh().await
    }

    /// Change page size; resets to the first page.
    pub async fn set_page_size(&self, size: u32) -> Result<()> {
        {
            let mut view = self.view.write().await;
            view.paginate.size = size;
            view.paginate.page = 0;
        }
        self.refresh().await
    }

    /// Sort by a field: repeating the current field toggles direction, a
    /// new field starts ascending. Either way the view returns to the
    /// first page.
    pub async fn sort_by(&self, field: &str) -> Result<()> {
        {
            let mut view = self.view.write().await;
            if view.paginate.sort == field {
                view.paginate.sort_direction = view.paginate.sort_direction.toggled();
            } else {
                view.paginate.sort = field.to_string();
                view.paginate.sort_direction = SortDirection::Asc;
            }
            view.paginate.page = 0;
        }
        self.refresh().await
    }

    /// Apply a search term; resets to the first page. An empty term clears
    /// the search.
    pub async fn search(&self, term: &str) -> Result<()> {
        {
            let mut view = self.view.write().await;
            view.search_term = if term.trim().is_empty() {
                None
            } else {
                Some(term.to_string())
            };
            view.paginate.page = 0;
        }
        self.refresh().await
    }

    /// Invert one user's effective status, then refetch the full page so
    /// local state reflects the server's answer. No optimistic update.
    pub async fn toggle_activation(&self, user_id: &str) -> Result<()> {
        let user = self
            .find(user_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

        let state = user.next_activation_state();
        tracing::info!(user_id, state, "toggling user activation");
        self.gateway.set_user_activation(user_id, state).await?;

        self.refresh().await
    }

    async fn find(&self, user_id: &str) -> Option<UserRecord> {
        self.view
            .read()
            .await
            .page
            .content
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }
}
