//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Database operation failed",
        "error": "DATABASE_ERROR",
        "code": 2001
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Request validation failed",
        "error": "VALIDATION_ERROR",
        "code": 1001,
        "details": {
            "rating": [{
                "code": "range",
                "message": null,
                "params": {"min": 1, "max": 5, "value": 9}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Search query is required",
        "error": "BAD_REQUEST",
        "code": 1009
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Product not found",
        "error": "NOT_FOUND",
        "code": 1004
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized - caller identity missing",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Authentication required",
        "error": "UNAUTHORIZED",
        "code": 1006
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - resource changed concurrently",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Product was modified concurrently, please retry",
        "error": "CONFLICT",
        "code": 1008
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Database is not connected",
        "error": "SERVICE_UNAVAILABLE",
        "code": 1011
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
