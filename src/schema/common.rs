use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub message: String,
}

impl BadRequestResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Access token required or invalid".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ForbiddenResponse {
    pub message: String,
}

impl Default for ForbiddenResponse {
    fn default() -> Self {
        Self {
            message: "Insufficient permissions".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub message: String,
}

impl NotFoundResponse {
    pub fn new(entity: &str, id: &str) -> Self {
        Self {
            message: format!("{} with id = {} not found", entity, id),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct InternalServerErrorResponse {
    pub message: String,
}

impl InternalServerErrorResponse {
    /// Logs the failing step and surfaces the raw error to the caller.
    pub fn new(module: &str, function: &str, process: &str, err: &str) -> Self {
        tracing::error!("{} {}: {} failed: {}", module, function, process, err);
        Self {
            message: err.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}
