// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Schema migrations for the five tables backing the incident pipeline.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_tables::Migration)]
    }
}

mod m20250101_000001_create_tables {
    use sea_orm_migration::prelude::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AlertIncidents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AlertIncidents::IncidentKey)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AlertIncidents::MessageId).string().null())
                        .col(ColumnDef::new(AlertIncidents::ChannelId).string().not_null())
                        .col(ColumnDef::new(AlertIncidents::ThreadId).string().null())
                        .col(ColumnDef::new(AlertIncidents::State).string().not_null())
                        .col(ColumnDef::new(AlertIncidents::RuleName).string().not_null())
                        .col(ColumnDef::new(AlertIncidents::Severity).string().not_null())
                        .col(
                            ColumnDef::new(AlertIncidents::UpdatedAt)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AlertIncidents::AcknowledgedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AlertIncidents::AcknowledgedAt)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(AlertIncidents::ResolvedBy).string().null())
                        .col(ColumnDef::new(AlertIncidents::ResolvedAt).big_integer().null())
                        .col(
                            ColumnDef::new(AlertIncidents::MentionLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AlertIncidents::ExpiresAt)
                                .big_integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_alert_incidents_state")
                        .table(AlertIncidents::Table)
                        .col(AlertIncidents::State)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AlertDedupState::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AlertDedupState::Fingerprint)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(AlertDedupState::ExpiresAt)
                                .big_integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AlertsConfig::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AlertsConfig::Id)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AlertsConfig::Rules).json().not_null())
                        .col(
                            ColumnDef::new(AlertsConfig::UpdatedAt)
                                .big_integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TroubleshootingGuides::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TroubleshootingGuides::RuleName)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TroubleshootingGuides::Content)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TroubleshootingGuides::UpdatedAt)
                                .big_integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AlertEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AlertEvents::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AlertEvents::AlertId).string().not_null())
                        .col(ColumnDef::new(AlertEvents::Resource).string().null())
                        .col(ColumnDef::new(AlertEvents::Status).string().not_null())
                        .col(ColumnDef::new(AlertEvents::MessageId).string().null())
                        .col(ColumnDef::new(AlertEvents::ChannelId).string().null())
                        .col(ColumnDef::new(AlertEvents::Severity).string().not_null())
                        .col(ColumnDef::new(AlertEvents::RuleName).string().not_null())
                        .col(ColumnDef::new(AlertEvents::Source).string().not_null())
                        .col(
                            ColumnDef::new(AlertEvents::AcknowledgedBy)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(AlertEvents::ResolvedBy).string().null())
                        .col(
                            ColumnDef::new(AlertEvents::CreatedAt)
                                .big_integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_alert_events_created_at")
                        .table(AlertEvents::Table)
                        .col(AlertEvents::CreatedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AlertEvents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TroubleshootingGuides::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AlertsConfig::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AlertDedupState::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AlertIncidents::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum AlertIncidents {
        Table,
        IncidentKey,
        MessageId,
        ChannelId,
        ThreadId,
        State,
        RuleName,
        Severity,
        UpdatedAt,
        AcknowledgedBy,
        AcknowledgedAt,
        ResolvedBy,
        ResolvedAt,
        MentionLevel,
        ExpiresAt,
    }

    #[derive(DeriveIden)]
    enum AlertDedupState {
        Table,
        Fingerprint,
        ExpiresAt,
    }

    #[derive(DeriveIden)]
    enum AlertsConfig {
        Table,
        Id,
        Rules,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TroubleshootingGuides {
        Table,
        RuleName,
        Content,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum AlertEvents {
        Table,
        Id,
        AlertId,
        Resource,
        Status,
        MessageId,
        ChannelId,
        Severity,
        RuleName,
        Source,
        AcknowledgedBy,
        ResolvedBy,
        CreatedAt,
    }
}
