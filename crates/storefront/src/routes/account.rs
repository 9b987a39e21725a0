//! Address book route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use trizen_core::AddressId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::supabase::types::{Address, NewAddress};

/// Saved address display data.
#[derive(Clone)]
pub struct AddressListView {
    pub id: String,
    pub label: String,
    pub name: String,
    pub phone: String,
    pub area: String,
    pub details: String,
    pub is_default: bool,
}

impl From<&Address> for AddressListView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.label.clone(),
            name: address.name.clone(),
            phone: address.phone.clone(),
            area: address.area.clone(),
            details: address.details.clone(),
            is_default: address.is_default,
        }
    }
}

/// Address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub label: String,
    pub name: String,
    pub phone: String,
    pub area: String,
    pub details: String,
    pub is_default: Option<String>,
}

impl AddressForm {
    fn into_payload(self, user_id: trizen_core::UserId) -> NewAddress {
        NewAddress {
            user_id,
            label: self.label,
            name: self.name,
            phone: self.phone,
            area: self.area,
            details: self.details,
            // Checkbox: present when ticked
            is_default: self.is_default.is_some(),
        }
    }
}

/// Address list page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub addresses: Vec<AddressListView>,
}

/// Address form page template, shared by new and edit.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub heading: String,
    pub action: String,
    pub address: Option<AddressListView>,
}

/// List the user's saved addresses.
#[instrument(skip(state, user))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let addresses = state
        .supabase()
        .list_addresses(&user.access_token, &user.id)
        .await?;

    Ok(AddressesTemplate {
        addresses: addresses.iter().map(AddressListView::from).collect(),
    }
    .into_response())
}

/// Display the new-address form.
#[instrument(skip(_user))]
pub async fn new_address(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    AddressFormTemplate {
        heading: "নতুন ঠিকানা".to_string(),
        action: "/account/addresses".to_string(),
        address: None,
    }
}

/// Create a new address.
#[instrument(skip(state, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let payload = form.into_payload(user.id.clone());
    state
        .supabase()
        .create_address(&user.access_token, &payload)
        .await?;

    Ok(Redirect::to("/account/addresses").into_response())
}

/// Display the edit form for one address.
#[instrument(skip(state, user))]
pub async fn edit_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let address_id = AddressId::new(id);

    let addresses = state
        .supabase()
        .list_addresses(&user.access_token, &user.id)
        .await?;

    let address = addresses
        .iter()
        .find(|a| a.id == address_id)
        .map(AddressListView::from)
        .ok_or_else(|| AppError::NotFound(format!("address {address_id}")))?;

    Ok(AddressFormTemplate {
        heading: "ঠিকানা সম্পাদনা".to_string(),
        action: format!("/account/addresses/{address_id}"),
        address: Some(address),
    }
    .into_response())
}

/// Update an existing address.
#[instrument(skip(state, user, form))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let address_id = AddressId::new(id);
    let payload = form.into_payload(user.id.clone());

    state
        .supabase()
        .update_address(&user.access_token, &address_id, &payload)
        .await?;

    Ok(Redirect::to("/account/addresses").into_response())
}
