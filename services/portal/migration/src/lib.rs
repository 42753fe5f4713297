use sea_orm_migration::prelude::*;

mod m20260301_000001_create_staff_users;
mod m20260301_000002_create_parents;
mod m20260301_000003_create_students;
mod m20260301_000004_create_homeworks;
mod m20260301_000005_create_otp_codes;
mod m20260301_000006_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_staff_users::Migration),
            Box::new(m20260301_000002_create_parents::Migration),
            Box::new(m20260301_000003_create_students::Migration),
            Box::new(m20260301_000004_create_homeworks::Migration),
            Box::new(m20260301_000005_create_otp_codes::Migration),
            Box::new(m20260301_000006_create_outbox_events::Migration),
        ]
    }
}
