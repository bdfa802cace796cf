//! Identity header injection.
//!
//! # Responsibilities
//! - Define the identity header names added to forwarded requests
//! - Overwrite any client-supplied value under those names
//!
//! # Design Decisions
//! - Headers are always overwritten, never merged: values arriving from the
//!   client connection under these names are untrusted
//! - An identity field that is not a valid header value removes the header
//!   entirely rather than leaving the client's value in place

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::identity::PeerIdentity;

/// Login name of the resolved caller.
pub static MESH_USER_LOGIN: HeaderName = HeaderName::from_static("mesh-user-login");

/// Display name of the resolved caller.
pub static MESH_USER_NAME: HeaderName = HeaderName::from_static("mesh-user-name");

/// Profile picture URL of the resolved caller.
pub static MESH_USER_PROFILE_PIC: HeaderName = HeaderName::from_static("mesh-user-profile-pic");

/// Set the three identity headers from `identity`, overwriting whatever the
/// client sent under those names.
pub fn apply_identity(headers: &mut HeaderMap, identity: &PeerIdentity) {
    set_or_remove(headers, &MESH_USER_LOGIN, &identity.login_name);
    set_or_remove(headers, &MESH_USER_NAME, &identity.display_name);
    set_or_remove(headers, &MESH_USER_PROFILE_PIC, &identity.profile_pic_url);
}

fn set_or_remove(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name.clone(), value);
        }
        Err(_) => {
            headers.remove(name);
            tracing::warn!(
                header = %name,
                "Identity field is not a valid header value, dropping header"
            );
        }
    }
}
