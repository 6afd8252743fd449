use rating_core::{Subject, SubjectId, SubjectKind};

use db::{Database, DbConfig, DbError};

/// Fresh in-memory database with the schema applied.
pub async fn setup_db() -> Result<Database, DbError> {
    db::init(&DbConfig::memory()).await
}

pub fn subject(id: &str, title: &str) -> Subject {
    let id = SubjectId::parse(id).expect("valid subject id");
    Subject::new(id, title, SubjectKind::Movie)
}
