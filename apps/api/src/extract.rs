//! `Json` and `Path` extractors that reject with `AppError::Validation`, so a
//! malformed body or id answers 400 in the usual `{error:{code,message}}`
//! envelope instead of axum's plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
