use crate::domain::entities::{
    IssueTemplate, NewIssueTemplate, ReorderDirection, ScopeFilter, TemplateOrder, TemplateQuery,
    TemplateType,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::template_repository::TemplateRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{Any, QueryBuilder, Row};
use std::collections::HashSet;

const TEMPLATE_COLUMNS: &str = "id, name, description, content, template_type, project_id, tracker_id, \
     issue_status_id, position, is_global, enabled, created_at, updated_at";

fn row_to_template(row: &AnyRow) -> ApiResult<IssueTemplate> {
    let template_type: String = row.try_get("template_type")?;
    let template_type: TemplateType = template_type.parse().map_err(|_| {
        ApiError::Internal(format!("Unknown template type in storage: {}", template_type))
    })?;

    Ok(IssueTemplate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row
            .try_get::<Option<String>, _>("description")
            .ok()
            .flatten(),
        content: row.try_get("content")?,
        template_type,
        project_id: row.try_get::<Option<i64>, _>("project_id").ok().flatten(),
        tracker_id: row.try_get::<Option<i64>, _>("tracker_id").ok().flatten(),
        issue_status_id: row.try_get::<Option<i64>, _>("issue_status_id").ok().flatten(),
        position: row.try_get("position")?,
        is_global: row.try_get::<i64, _>("is_global")? != 0,
        enabled: row.try_get::<i64, _>("enabled")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_scope_filter(builder: &mut QueryBuilder<'_, Any>, column: &str, filter: ScopeFilter) {
    match filter {
        ScopeFilter::Any => {}
        ScopeFilter::IsNull => {
            builder.push(format!(" AND {} IS NULL", column));
        }
        ScopeFilter::Equals(id) => {
            builder.push(format!(" AND {} = ", column));
            builder.push_bind(id);
        }
        ScopeFilter::NullOrEquals(id) => {
            builder.push(format!(" AND ({} IS NULL OR {} = ", column, column));
            builder.push_bind(id);
            builder.push(")");
        }
    }
}

fn position_taken(template_type: TemplateType, position: i64) -> ApiError {
    DomainError::ValidationError(format!(
        "Position {} is already used by another {} template",
        position, template_type
    ))
    .into()
}

fn has_duplicate_positions(scope: &[(i64, i64)]) -> bool {
    let mut seen = HashSet::new();
    !scope.iter().all(|(_, position)| seen.insert(*position))
}

#[async_trait]
impl TemplateRepository for Database {
    async fn create_template(&self, template: &NewIssueTemplate) -> ApiResult<IssueTemplate> {
        let now = chrono::Utc::now().to_rfc3339();

        // The slot is chosen and checked in the same statement that claims it
        let rows = sqlx::query(
            "INSERT INTO issue_templates (name, description, content, template_type, project_id, tracker_id,
                 issue_status_id, position, is_global, enabled, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, slot.position, ?, ?, ?, ?
             FROM (SELECT COALESCE(?, (SELECT COALESCE(MAX(position), 0) + 1
                                       FROM issue_templates WHERE template_type = ?)) AS position) AS slot
             WHERE NOT EXISTS (
                 SELECT 1 FROM issue_templates WHERE template_type = ? AND position = slot.position
             )
             RETURNING id",
        )
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.content)
        .bind(template.template_type.as_str())
        .bind(template.project_id)
        .bind(template.tracker_id)
        .bind(template.issue_status_id)
        .bind(template.is_global)
        .bind(template.enabled)
        .bind(&now)
        .bind(&now)
        .bind(template.position)
        .bind(template.template_type.as_str())
        .bind(template.template_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        let Some(row) = rows.first() else {
            return Err(position_taken(
                template.template_type,
                template.position.unwrap_or_default(),
            ));
        };
        let id: i64 = row.try_get("id")?;

        let created = self
            .get_template_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Template {} vanished after insert", id)))?;

        tracing::info!(
            "Template created: id={}, name={}, type={}, position={}",
            created.id,
            created.name,
            created.template_type,
            created.position
        );
        Ok(created)
    }

    async fn get_template_by_id(&self, id: i64) -> ApiResult<Option<IssueTemplate>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM issue_templates WHERE id = ?",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_template).transpose()
    }

    async fn update_template(&self, template: &IssueTemplate, claim_position: bool) -> ApiResult<()> {
        // Position and type are only written when claimed, so an edit never
        // restores a position a concurrent move has just changed
        let mut sql = String::from(
            "UPDATE issue_templates
             SET name = ?, description = ?, content = ?, project_id = ?, tracker_id = ?,
                 issue_status_id = ?, is_global = ?, enabled = ?, updated_at = ?",
        );
        if claim_position {
            sql.push_str(", template_type = ?, position = ?");
        }
        sql.push_str(" WHERE id = ?");
        if claim_position {
            sql.push_str(
                " AND NOT EXISTS (
                     SELECT 1 FROM issue_templates
                     WHERE template_type = ? AND position = ? AND id <> ?
                 )",
            );
        }

        let mut query = sqlx::query(&sql)
            .bind(&template.name)
            .bind(&template.description)
            .bind(&template.content)
            .bind(template.project_id)
            .bind(template.tracker_id)
            .bind(template.issue_status_id)
            .bind(template.is_global)
            .bind(template.enabled)
            .bind(&template.updated_at);
        if claim_position {
            query = query
                .bind(template.template_type.as_str())
                .bind(template.position);
        }
        query = query.bind(template.id);
        if claim_position {
            query = query
                .bind(template.template_type.as_str())
                .bind(template.position)
                .bind(template.id);
        }

        let result = query.execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            if claim_position && self.get_template_by_id(template.id).await?.is_some() {
                return Err(position_taken(template.template_type, template.position));
            }
            return Err(ApiError::NotFound(format!(
                "Template {} not found",
                template.id
            )));
        }

        Ok(())
    }

    async fn delete_template(&self, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM issue_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_templates(&self, query: &TemplateQuery) -> ApiResult<Vec<IssueTemplate>> {
        let mut builder: QueryBuilder<Any> = QueryBuilder::new(format!(
            "SELECT {} FROM issue_templates WHERE 1 = 1",
            TEMPLATE_COLUMNS
        ));

        if let Some(template_type) = query.template_type {
            builder.push(" AND template_type = ");
            builder.push_bind(template_type.as_str());
        }

        if query.enabled_only {
            builder.push(" AND enabled = 1");
        }

        if let Some(is_global) = query.is_global {
            builder.push(" AND is_global = ");
            builder.push_bind(if is_global { 1_i64 } else { 0_i64 });
        }

        push_scope_filter(&mut builder, "project_id", query.project);
        push_scope_filter(&mut builder, "tracker_id", query.tracker);
        push_scope_filter(&mut builder, "issue_status_id", query.status);

        builder.push(match query.order {
            TemplateOrder::PositionName => " ORDER BY position ASC, name ASC, id ASC",
            TemplateOrder::PositionId => " ORDER BY position ASC, id ASC",
            TemplateOrder::Grouped => {
                " ORDER BY template_type ASC, project_id ASC, tracker_id ASC, position ASC, id ASC"
            }
        });

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter().map(row_to_template).collect()
    }

    async fn count_templates(&self) -> ApiResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM issue_templates")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    async fn swap_positions(&self, first_id: i64, second_id: i64) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        // Start transaction
        let mut tx = self.pool.begin().await?;

        let mut slots = Vec::with_capacity(2);
        for id in [first_id, second_id] {
            let row = sqlx::query("SELECT position, template_type FROM issue_templates WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", id)))?;

            let position: i64 = row.try_get("position")?;
            let template_type: String = row.try_get("template_type")?;
            slots.push((position, template_type));
        }

        if slots[0].1 != slots[1].1 {
            return Err(ApiError::BadRequest(
                "Cannot swap templates of different types".to_string(),
            ));
        }

        for (id, position) in [(first_id, slots[1].0), (second_id, slots[0].0)] {
            sqlx::query("UPDATE issue_templates SET position = ?, updated_at = ? WHERE id = ?")
                .bind(position)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        // Commit transaction
        tx.commit().await?;

        tracing::debug!(
            "Swapped positions of templates {} and {} ({} <-> {})",
            first_id,
            second_id,
            slots[0].0,
            slots[1].0
        );
        Ok(())
    }

    async fn move_in_scope(
        &self,
        template_id: i64,
        direction: ReorderDirection,
    ) -> ApiResult<Option<i64>> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let template_type: String =
            sqlx::query("SELECT template_type FROM issue_templates WHERE id = ?")
                .bind(template_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", template_id)))?
                .try_get("template_type")?;

        let rows = sqlx::query(
            "SELECT id, position FROM issue_templates
             WHERE template_type = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(&template_type)
        .fetch_all(&mut *tx)
        .await?;

        let mut scope = rows
            .iter()
            .map(|row| Ok((row.try_get::<i64, _>("id")?, row.try_get::<i64, _>("position")?)))
            .collect::<Result<Vec<(i64, i64)>, sqlx::Error>>()?;

        if has_duplicate_positions(&scope) {
            tracing::warn!(
                "Duplicate positions found in {} templates, renumbering",
                template_type
            );
            for (index, (id, position)) in scope.iter_mut().enumerate() {
                let dense = index as i64 + 1;
                if *position != dense {
                    sqlx::query("UPDATE issue_templates SET position = ?, updated_at = ? WHERE id = ?")
                        .bind(dense)
                        .bind(&now)
                        .bind(*id)
                        .execute(&mut *tx)
                        .await?;
                    *position = dense;
                }
            }
        }

        let index = scope
            .iter()
            .position(|(id, _)| *id == template_id)
            .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", template_id)))?;

        let Some(neighbor) = direction.neighbor_index(index, scope.len()) else {
            // Keeps any renumbering
            tx.commit().await?;
            return Ok(None);
        };

        let (moved_id, moved_position) = scope[index];
        let (other_id, other_position) = scope[neighbor];
        for (id, position) in [(moved_id, other_position), (other_id, moved_position)] {
            sqlx::query("UPDATE issue_templates SET position = ?, updated_at = ? WHERE id = ?")
                .bind(position)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Moved template {} {:?}: {} <-> {}",
            moved_id,
            direction,
            moved_position,
            other_position
        );
        Ok(Some(other_id))
    }
}
