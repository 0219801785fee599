use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

pub mod entities;
pub mod services;

use entities::prelude::{Project, ProjectTag, Tag};

/// Opens a pooled connection to the database.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Creates the tables for all entities if they do not exist yet.
///
/// This stands in for a migration layer: the schema is derived from the
/// entity definitions, so table shape and entities cannot drift apart.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(Project),
        schema.create_table_from_entity(Tag),
        schema.create_table_from_entity(ProjectTag),
    ];
    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(statement)).await?;
    }
    Ok(())
}
