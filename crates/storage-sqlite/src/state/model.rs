use diesel::prelude::*;

/// Database row for one device-state entry.
#[derive(Queryable, Insertable, AsChangeset, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::device_state)]
#[diesel(primary_key(setting_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeviceStateRow {
    pub setting_key: String,
    pub setting_value: String,
}
