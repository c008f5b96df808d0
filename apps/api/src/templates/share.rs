use uuid::Uuid;

/// Public link for a template: `<origin>/<template id>`.
pub fn share_url(public_base_url: &str, template_id: Uuid) -> String {
    format!("{}/{}", public_base_url.trim_end_matches('/'), template_id)
}
