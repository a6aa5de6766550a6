use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Phrases {
    Table,
    Phrase,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum PhraseTags {
    Table,
    TagId,
    Phrase,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum SessionTags {
    Table,
    SessionId,
    TagId,
}

#[derive(Iden)]
enum Boards {
    Table,
    Code,
    SessionId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BoardCards {
    Table,
    BoardCode,
    CardIndex,
    Phrase,
    Category,
    Revealed,
    RevealedAtVersion,
}

#[derive(Iden)]
enum Selections {
    Table,
    BoardCode,
    Participant,
    CardIndex,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // phrases
        manager
            .create_table(
                Table::create()
                    .table(Phrases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Phrases::Phrase).string().not_null().primary_key())
                    .to_owned(),
            )
            .await?;

        // tags
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_name_unique")
                    .table(Tags::Table)
                    .col(Tags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // phrase_tags (M:N between tags and phrases)
        manager
            .create_table(
                Table::create()
                    .table(PhraseTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PhraseTags::TagId).big_integer().not_null())
                    .col(ColumnDef::new(PhraseTags::Phrase).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(PhraseTags::TagId)
                            .col(PhraseTags::Phrase),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phrase_tags_tag")
                            .from(PhraseTags::Table, PhraseTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phrase_tags_phrase")
                            .from(PhraseTags::Table, PhraseTags::Phrase)
                            .to(Phrases::Table, Phrases::Phrase)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_phrase_tags_phrase")
                    .table(PhraseTags::Table)
                    .col(PhraseTags::Phrase)
                    .to_owned(),
            )
            .await?;

        // sessions
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Sessions::Name).string().null())
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // session_tags (the tag filter picked at session start)
        manager
            .create_table(
                Table::create()
                    .table(SessionTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SessionTags::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(SessionTags::TagId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(SessionTags::SessionId)
                            .col(SessionTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_tags_session")
                            .from(SessionTags::Table, SessionTags::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_tags_tag")
                            .from(SessionTags::Table, SessionTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // boards
        manager
            .create_table(
                Table::create()
                    .table(Boards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Boards::Code).string().not_null().primary_key())
                    .col(ColumnDef::new(Boards::SessionId).big_integer().null())
                    .col(
                        ColumnDef::new(Boards::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Boards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Boards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boards_session")
                            .from(Boards::Table, Boards::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_boards_session_id")
                    .table(Boards::Table)
                    .col(Boards::SessionId)
                    .to_owned(),
            )
            .await?;

        // board_cards
        manager
            .create_table(
                Table::create()
                    .table(BoardCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BoardCards::BoardCode).string().not_null())
                    .col(ColumnDef::new(BoardCards::CardIndex).integer().not_null())
                    .col(ColumnDef::new(BoardCards::Phrase).string().not_null())
                    .col(ColumnDef::new(BoardCards::Category).string_len(16).not_null())
                    .col(
                        ColumnDef::new(BoardCards::Revealed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BoardCards::RevealedAtVersion).integer().null())
                    .primary_key(
                        Index::create()
                            .col(BoardCards::BoardCode)
                            .col(BoardCards::CardIndex),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_cards_board")
                            .from(BoardCards::Table, BoardCards::BoardCode)
                            .to(Boards::Table, Boards::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_cards_phrase")
                            .from(BoardCards::Table, BoardCards::Phrase)
                            .to(Phrases::Table, Phrases::Phrase)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // A phrase appears at most once per board
        manager
            .create_index(
                Index::create()
                    .name("idx_board_cards_board_phrase_unique")
                    .table(BoardCards::Table)
                    .col(BoardCards::BoardCode)
                    .col(BoardCards::Phrase)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // selections (one row per participant per board)
        manager
            .create_table(
                Table::create()
                    .table(Selections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Selections::BoardCode).string().not_null())
                    .col(ColumnDef::new(Selections::Participant).string().not_null())
                    .col(ColumnDef::new(Selections::CardIndex).integer().not_null())
                    .col(
                        ColumnDef::new(Selections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Selections::BoardCode)
                            .col(Selections::Participant),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_selections_board")
                            .from(Selections::Table, Selections::BoardCode)
                            .to(Boards::Table, Boards::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_selections_board_card")
                    .table(Selections::Table)
                    .col(Selections::BoardCode)
                    .col(Selections::CardIndex)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Selections::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BoardCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Boards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhraseTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Phrases::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
