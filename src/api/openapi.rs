//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalog, health, incidents, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Almacen API",
        version = "1.0.0",
        description = "Inventory & Equipment Loan Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::create_loan,
        loans::list_loans,
        loans::get_loan,
        loans::return_loan,
        loans::get_availability,
        // Catalog
        catalog::list_items,
        catalog::get_item,
        catalog::get_part,
        // Incidents
        incidents::create_incident,
        incidents::list_incidents,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::BorrowerType,
            crate::models::enums::LoanStatus,
            crate::models::enums::AssetStatus,
            crate::models::enums::ReturnCondition,
            crate::models::enums::IncidentKind,
            // Catalog
            crate::models::catalog::Item,
            crate::models::catalog::ItemShort,
            crate::models::catalog::Part,
            crate::models::catalog::PartShort,
            crate::models::catalog::ItemDetails,
            crate::models::catalog::PartAvailability,
            crate::models::catalog::AvailabilityReport,
            // Loans
            crate::models::loan::CreateLoan,
            crate::models::loan::LineRequest,
            crate::models::loan::ProcessReturn,
            crate::models::loan::ReturnDecision,
            crate::models::loan::LoanDetails,
            crate::models::loan::LineDetails,
            // Incidents
            crate::models::incident::Incident,
            crate::models::incident::IncidentPart,
            crate::models::incident::IncidentDetails,
            crate::models::incident::CreateIncident,
            crate::models::incident::IncidentPartRequest,
            // Users
            crate::models::user::UserShort,
            // Stats
            stats::StatsResponse,
            stats::LoanStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan ledger: creation, availability, returns"),
        (name = "catalog", description = "Catalog read access"),
        (name = "incidents", description = "Incident reporting"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
