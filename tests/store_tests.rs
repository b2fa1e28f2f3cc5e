//! Store behaviour against a file-backed SQLite database, where several
//! connections write at once.

use std::collections::HashSet;

use futures_util::future::join_all;
use tempfile::TempDir;

mod common;

use common::*;
use splab::ids;
use splab::models::{BugPatch, BugStatus, Category, NewFix};
use splab::store;
use splab::uploads::UploadStore;

struct FileDb {
    pool: sqlx::SqlitePool,
    uploads: UploadStore,
    dir: TempDir,
}

async fn file_db() -> FileDb {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("splab.db").display());
    let pool = store::connect(&url).await.expect("open file database");
    store::migrate(&pool).await.expect("run schema");
    FileDb {
        uploads: UploadStore::new(dir.path().join("media")),
        pool,
        dir,
    }
}

fn fix_for(bug_id: i64, fixer: &str) -> NewFix {
    NewFix {
        bug_id,
        description: "patched".to_string(),
        status: BugStatus::Resolved,
        full_name: fixer.to_string(),
        email: format!("{}@example.com", fixer.to_lowercase()),
        phone: "555-0202".to_string(),
        evidence_media: None,
        evidence_code: None,
    }
}

#[actix_web::test]
async fn concurrent_bug_creation_assigns_unique_numbers() {
    let db = file_db().await;
    let bugs: Vec<_> = (0..40).map(|i| new_bug(&format!("bug {}", i), Category::Ui)).collect();

    let results = join_all(bugs.iter().map(|bug| store::create_bug(&db.pool, &db.uploads, bug))).await;

    let mut numbers = HashSet::new();
    for result in results {
        let created = result.expect("concurrent create succeeds");
        let splab = created.bug.splab_number.expect("number assigned");
        assert!(ids::is_well_formed(ids::BUG_PREFIX, &splab));
        assert!(numbers.insert(splab));
    }
    assert_eq!(store::count_bugs(&db.pool, None).await.unwrap(), 40);
    assert!(db.dir.path().join("splab.db").exists());
}

#[actix_web::test]
async fn concurrent_fixes_and_edits_all_commit() {
    let db = file_db().await;
    let bug = store::create_bug(&db.pool, &db.uploads, &new_bug("shared", Category::Security))
        .await
        .expect("seed bug")
        .bug;

    let fixes: Vec<_> = (0..30).map(|i| fix_for(bug.id, &format!("fixer{}", i))).collect();
    let patch = BugPatch {
        title: Some("shared and renamed".to_string()),
        ..BugPatch::default()
    };
    let more_bugs: Vec<_> = (0..10).map(|i| new_bug(&format!("other {}", i), Category::Ui)).collect();

    let (fix_results, bug_results, edit) = futures_util::join!(
        join_all(fixes.iter().map(|fix| store::create_fix(&db.pool, &db.uploads, fix))),
        join_all(more_bugs.iter().map(|b| store::create_bug(&db.pool, &db.uploads, b))),
        store::update_bug(&db.pool, bug.id, &patch),
    );

    let mut numbers = HashSet::new();
    for result in fix_results {
        let fix = result.expect("concurrent fix succeeds");
        assert_eq!(fix.category, Category::Security);
        assert!(numbers.insert(fix.splf_number.expect("number assigned")));
    }
    for result in bug_results {
        result.expect("concurrent create succeeds");
    }
    let edited = edit.expect("edit succeeds").expect("bug exists");
    assert_eq!(edited.splab_number, bug.splab_number);

    assert_eq!(store::count_fixes(&db.pool, None).await.unwrap(), 30);
    assert_eq!(store::count_bugs(&db.pool, None).await.unwrap(), 11);
}
