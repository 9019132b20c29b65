use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Messages)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Follows)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Likes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        // Home feed scans: author filter plus newest-first sort.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_messages_user_created ON messages(user_id, created_at)",
        )
        .await?;

        // Reverse lookups on edges whose primary key leads with the other side.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(followed_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_likes_message ON likes(message_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Likes).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Follows).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Messages).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
