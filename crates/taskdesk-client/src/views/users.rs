//! Admin user management.

use std::sync::Arc;

use taskdesk_core::{
  FilterSet, Role,
  user::{UserFilter, UserFilterField},
};

use crate::{
  access::Access,
  error::ViewError,
  pagination::{ListController, ListEvent, MutationId},
  service::{UserAdminService, UserList},
};

pub struct UsersView<A: UserAdminService> {
  api:   Arc<A>,
  list:  ListController<UserList<A>>,
  /// Search box text; only committed into the filter by [`UsersView::search`].
  draft: String,
}

impl<A: UserAdminService> UsersView<A> {
  /// Admins only; everyone else gets [`ViewError::AccessDenied`].
  pub fn new(api: Arc<A>, access: Access) -> Result<Self, ViewError> {
    if !access.capabilities().manage_users {
      return Err(ViewError::AccessDenied);
    }
    Ok(Self {
      list: ListController::new(Arc::new(UserList(Arc::clone(&api)))),
      api,
      draft: String::new(),
    })
  }

  pub fn with_page_size(mut self, page_size: u32) -> Self {
    self.list.set_page_size(page_size);
    self
  }

  pub fn list(&self) -> &ListController<UserList<A>> { &self.list }

  pub fn list_mut(&mut self) -> &mut ListController<UserList<A>> { &mut self.list }

  pub fn draft(&self) -> &str { &self.draft }

  pub fn set_draft(&mut self, text: impl Into<String>) { self.draft = text.into(); }

  pub fn push_char(&mut self, c: char) { self.draft.push(c); }

  pub fn pop_char(&mut self) { self.draft.pop(); }

  pub fn load(&mut self) { self.list.load(); }

  /// Back to the first page, then load.
  pub fn refresh(&mut self) { self.list.search(); }

  /// Commit the draft query and load from the first page.
  pub fn search(&mut self) {
    let mut filter = self.list.filter().clone();
    match filter.set(UserFilterField::Query, &self.draft) {
      Ok(_) => self.list.apply_filter(filter),
      Err(e) => self.list.set_error(e.to_string()),
    }
  }

  /// Clear the query and load from the first page.
  pub fn reset(&mut self) {
    self.draft.clear();
    self.list.apply_filter(UserFilter::default());
  }

  pub fn change_role(&mut self, user_id: i64, role: Role) -> Result<MutationId, ViewError> {
    let api = Arc::clone(&self.api);
    self
      .list
      .mutate("change user role", async move {
        api.update_user_role(user_id, role).await.map(drop)
      })
      .ok_or(ViewError::Busy)
  }

  pub fn delete(&mut self, user_id: i64) -> Result<MutationId, ViewError> {
    let api = Arc::clone(&self.api);
    self
      .list
      .mutate("delete user", async move { api.delete_user(user_id).await })
      .ok_or(ViewError::Busy)
  }

  pub fn pump(&mut self) -> Vec<ListEvent> { self.list.pump() }

  pub async fn next_event(&mut self) -> ListEvent { self.list.next_event().await }
}
