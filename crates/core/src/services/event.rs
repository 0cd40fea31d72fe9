//! Department event service.

use crate::services::moderator::ModeratorService;
use chrono::{DateTime, Utc};
use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{department_event, department_moderator::ModeratorPermission},
    repositories::{DepartmentEventRepository, DepartmentRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(length(max = 256))]
    pub location_name: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: DepartmentEventRepository,
    department_repo: DepartmentRepository,
    moderator_service: ModeratorService,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(
        event_repo: DepartmentEventRepository,
        department_repo: DepartmentRepository,
        moderator_service: ModeratorService,
    ) -> Self {
        Self {
            event_repo,
            department_repo,
            moderator_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an event. Needs the `canCreateEvent` permission.
    pub async fn create(
        &self,
        actor_id: &str,
        department_id: &str,
        input: CreateEventInput,
    ) -> AppResult<department_event::Model> {
        input.validate()?;

        let department = self
            .moderator_service
            .authorize_in(department_id, actor_id, ModeratorPermission::CreateEvent)
            .await?;

        if input.ends_at.is_some_and(|end| end < input.starts_at) {
            return Err(AppError::Validation(
                "An event cannot end before it starts".to_string(),
            ));
        }

        let model = department_event::ActiveModel {
            id: Set(self.id_gen.generate()),
            department_id: Set(department.id.clone()),
            created_by: Set(actor_id.to_string()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            location_name: Set(input.location_name),
            starts_at: Set(input.starts_at.into()),
            ends_at: Set(input.ends_at.map(Into::into)),
            created_at: Set(Utc::now().into()),
        };

        let created = self.event_repo.create(model).await?;
        tracing::info!(event_id = %created.id, department_id = %department.id, "Created department event");

        Ok(created)
    }

    /// Events of a department, soonest first.
    pub async fn list(
        &self,
        department_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<department_event::Model>> {
        let department = self.department_repo.get_by_id(department_id).await?;

        self.event_repo
            .find_by_department(&department.id, limit.clamp(1, 100), offset)
            .await
    }
}
