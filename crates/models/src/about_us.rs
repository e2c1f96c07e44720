use std::fmt;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "about_us")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Section an about-us item belongs to. Labels other than the three known
/// ones are kept verbatim and shown on the site as values/other content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AboutUsKind {
    General,
    Mission,
    Vision,
    Other(String),
}

impl AboutUsKind {
    pub fn as_str(&self) -> &str {
        match self {
            AboutUsKind::General => "general",
            AboutUsKind::Mission => "mission",
            AboutUsKind::Vision => "vision",
            AboutUsKind::Other(label) => label,
        }
    }
}

impl From<&str> for AboutUsKind {
    fn from(s: &str) -> Self {
        match s {
            "general" => AboutUsKind::General,
            "mission" => AboutUsKind::Mission,
            "vision" => AboutUsKind::Vision,
            other => AboutUsKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AboutUsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_kind(db: &DatabaseConnection, kind: &str) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::Kind.eq(kind))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// First item with exactly this title (oldest wins when titles repeat).
pub async fn find_by_title(db: &DatabaseConnection, title: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::Title.eq(title))
        .order_by_asc(Column::Id)
        .one(db)
        .await?)
}

pub async fn create(db: &DatabaseConnection, title: &str, description: &str, kind: &str) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        kind: Set(kind.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, id: i32, title: &str, description: &str, kind: &str) -> Result<bool, errors::ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Title, Expr::value(title))
        .col_expr(Column::Description, Expr::value(description))
        .col_expr(Column::Kind, Expr::value(kind))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_known_and_free_form_labels() {
        assert_eq!(AboutUsKind::from("mission"), AboutUsKind::Mission);
        assert_eq!(AboutUsKind::from("valores"), AboutUsKind::Other("valores".into()));
        assert_eq!(AboutUsKind::Vision.to_string(), "vision");
        assert_eq!(AboutUsKind::Other("valores".into()).as_str(), "valores");
    }

    #[test]
    fn model_serializes_kind_as_type() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let m = Model {
            id: 1,
            title: "Misión".into(),
            description: "d".into(),
            kind: "mission".into(),
            created_at: now,
            updated_at: now,
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["type"], "mission");
        assert!(v.get("kind").is_none());
    }
}
