//! Fixture loading against an in-memory database.

use std::fs;
use std::path::PathBuf;

use rstest::*;
use seedbed_db::{
	AppConfig, Apps, DatabaseConnection, FieldDef, ModelMeta, QueryValue, SchemaEditor,
};
use seedbed_seeding::prelude::*;
use tempfile::TempDir;

const FIXTURE1: &str = r#"[
	{"pk": 2, "model": "news.article", "fields": {"headline": "Poker has no place on ESPN", "pub_date": "2006-06-16 12:00:00"}},
	{"pk": 3, "model": "news.article", "fields": {"headline": "Time to reform copyright", "pub_date": "2006-06-16 13:00:00"}}
]"#;

const FIXTURE2: &str = r#"[
	{"pk": 3, "model": "news.article", "fields": {"headline": "Copyright is fine the way it is", "pub_date": "2006-06-16 14:00:00"}},
	{"pk": 4, "model": "news.article", "fields": {"headline": "Django conquers world!", "pub_date": "2006-06-16 15:00:00"}}
]"#;

struct Env {
	_root: TempDir,
	root_path: PathBuf,
	conn: DatabaseConnection,
	apps: Apps,
}

impl Env {
	fn write_fixture(&self, name: &str, content: &str) {
		fs::write(self.root_path.join("news/fixtures").join(name), content).unwrap();
	}

	fn loader(&self, commit: bool) -> FixtureLoader {
		FixtureLoader::new(self.conn.clone(), self.apps.clone())
			.with_current_dir(&self.root_path)
			.with_options(LoadOptions::new().with_verbosity(0).with_commit(commit))
	}

	async fn headlines(&self) -> Vec<String> {
		self.conn
			.fetch_all(
				"SELECT \"headline\" FROM \"news_article\" ORDER BY \"pub_date\" DESC, \"headline\" ASC",
				vec![],
			)
			.await
			.unwrap()
			.iter()
			.map(|row| row.get::<String>("headline").unwrap())
			.collect()
	}
}

fn article_meta() -> ModelMeta {
	ModelMeta::new("news", "Article")
		.with_field(FieldDef::char("headline", 100).with_default("Default headline"))
		.with_field(FieldDef::datetime("pub_date"))
		.with_ordering(&["-pub_date", "headline"])
}

#[fixture]
async fn env() -> Env {
	let root = TempDir::new().unwrap();
	let root_path = root.path().to_path_buf();
	let app_dir = root_path.join("news");
	fs::create_dir_all(app_dir.join("fixtures")).unwrap();

	let apps =
		Apps::from_configs([AppConfig::new("news", &app_dir).with_model_meta(article_meta())])
			.unwrap();
	let conn = DatabaseConnection::connect_memory().await.unwrap();
	let editor = SchemaEditor::new(conn.clone());
	for meta in apps.all_models() {
		editor.create_model(&meta).await.unwrap();
	}

	let env = Env {
		_root: root,
		root_path,
		conn,
		apps,
	};
	env.write_fixture("fixture1.json", FIXTURE1);
	env.write_fixture("fixture2.json", FIXTURE2);
	env
}

#[rstest]
#[tokio::test]
async fn test_later_fixture_overwrites_overlapping_pks(#[future] env: Env) {
	let env = env.await;
	let result = env.loader(true).load_labels(&["fixture1.json"]).await.unwrap();
	assert_eq!(result.fixture_count, 1);
	assert_eq!(result.loaded_object_count, 2);
	assert_eq!(
		env.headlines().await,
		vec!["Time to reform copyright", "Poker has no place on ESPN"]
	);

	env.loader(true).load_labels(&["fixture2"]).await.unwrap();
	assert_eq!(
		env.headlines().await,
		vec![
			"Django conquers world!",
			"Copyright is fine the way it is",
			"Poker has no place on ESPN"
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_missing_fixture_warns_once(#[future] env: Env) {
	let env = env.await;
	env.loader(false).load_labels(&["fixture1.json"]).await.unwrap();

	let result = env.loader(false).load_labels(&["unknown.json"]).await.unwrap();
	assert_eq!(result.warnings, vec!["No fixture named 'unknown' found.".to_string()]);
	assert_eq!(result.fixture_count, 0);
	assert_eq!(env.headlines().await.len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_missing_initial_data_is_silent(#[future] env: Env) {
	let env = env.await;
	let result = env.loader(true).load_labels(&[INITIAL_DATA]).await.unwrap();
	assert!(result.warnings.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_empty_fixture_warns(#[future] env: Env) {
	let env = env.await;
	env.write_fixture("empty.json", "[]");
	let result = env.loader(true).load_labels(&["empty"]).await.unwrap();
	assert_eq!(result.fixture_count, 1);
	assert_eq!(
		result.warnings,
		vec!["No fixture data found for 'empty'. (File format may be invalid.)".to_string()]
	);
}

#[rstest]
#[tokio::test]
async fn test_failed_install_rolls_back_whole_load(#[future] env: Env) {
	let env = env.await;
	env.write_fixture(
		"broken.json",
		r#"[{"pk": 9, "model": "news.article", "fields": {"headline": "no date"}}]"#,
	);
	let err = env
		.loader(true)
		.load_labels(&["fixture1", "broken"])
		.await
		.unwrap_err();

	assert!(matches!(err, SeedingError::FixtureInstall { .. }));
	assert!(err.to_string().starts_with("Problem installing fixture '"));
	assert!(err.to_string().contains("broken.json"));
	assert!(env.headlines().await.is_empty());
	assert!(!env.conn.in_atomic_block());
}

#[rstest]
#[tokio::test]
async fn test_uncommitted_load_joins_caller_transaction(#[future] env: Env) {
	let env = env.await;
	env.conn.set_autocommit(false).await.unwrap();
	env.loader(false).load_labels(&["fixture1"]).await.unwrap();
	assert_eq!(env.headlines().await.len(), 2);
	env.conn.rollback().await.unwrap();
	env.conn.set_autocommit(true).await.unwrap();

	assert!(env.headlines().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_commit_load_inside_managed_transaction(#[future] env: Env) {
	let env = env.await;
	let outer = env.conn.atomic().await.unwrap();
	env.loader(true).load_labels(&["fixture1"]).await.unwrap();
	outer.rollback().await.unwrap();

	assert!(env.headlines().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_app_label_filter(#[future] env: Env) {
	let env = env.await;
	let loader = FixtureLoader::new(env.conn.clone(), env.apps.clone())
		.with_current_dir(&env.root_path)
		.with_options(
			LoadOptions::new()
				.with_verbosity(1)
				.with_app_labels(vec!["library".to_string()]),
		);
	let result = loader.load_labels(&["fixture1"]).await.unwrap();
	assert_eq!(result.loaded_object_count, 0);
	assert_eq!(result.fixture_object_count, 2);
	assert_eq!(
		result.messages,
		vec!["Installed 0 object(s) (of 2) from 1 fixture(s)".to_string()]
	);
}

#[rstest]
#[case(vec!["news"], 2)]
#[case(vec!["news", "library"], 2)]
#[case(vec!["library"], 0)]
#[tokio::test]
async fn test_app_label_filter_keeps_matching_records(
	#[future] env: Env,
	#[case] labels: Vec<&str>,
	#[case] loaded: usize,
) {
	let env = env.await;
	let loader = FixtureLoader::new(env.conn.clone(), env.apps.clone())
		.with_current_dir(&env.root_path)
		.with_options(
			LoadOptions::new()
				.with_verbosity(0)
				.with_app_labels(labels.into_iter().map(String::from).collect()),
		);
	let result = loader.load_labels(&["fixture1"]).await.unwrap();
	assert_eq!(result.fixture_object_count, 2);
	assert_eq!(result.loaded_object_count, loaded);
	assert_eq!(env.headlines().await.len(), loaded);
}

#[rstest]
#[tokio::test]
async fn test_unknown_field_and_ignore_nonexistent(#[future] env: Env) {
	let env = env.await;
	env.write_fixture(
		"extra.json",
		r#"[{"pk": 1, "model": "news.article", "fields": {"pub_date": "2006-06-16 09:00:00", "author": "x"}}]"#,
	);
	assert!(env.loader(true).load_labels(&["extra"]).await.is_err());

	let loader = FixtureLoader::new(env.conn.clone(), env.apps.clone())
		.with_current_dir(&env.root_path)
		.with_options(
			LoadOptions::new()
				.with_verbosity(0)
				.with_ignore_nonexistent(true),
		);
	loader.load_labels(&["extra"]).await.unwrap();
	assert_eq!(env.headlines().await, vec!["Default headline"]);
}

#[rstest]
#[tokio::test]
async fn test_no_labels_is_an_error(#[future] env: Env) {
	let env = env.await;
	assert!(matches!(
		env.loader(true).load_labels(&[]).await,
		Err(SeedingError::ValidationError { .. })
	));
}

#[rstest]
#[tokio::test]
async fn test_dump_then_load_by_path(#[future] env: Env) {
	let env = env.await;
	env.loader(true)
		.load_labels(&["fixture1", "fixture2"])
		.await
		.unwrap();

	let out = env.root_path.join("dump.json.gz");
	let dump = DumpDataCommand::new(env.conn.clone(), env.apps.clone())
		.execute(
			DumpDataArgs {
				labels: vec!["news".to_string()],
			},
			DumpDataOptions::new().with_indent(2).with_output(&out),
		)
		.await
		.unwrap();
	assert_eq!(dump.records.len(), 3);
	assert_eq!(dump.records[0].pk, Some(serde_json::json!(2)));

	env.conn
		.execute("DELETE FROM \"news_article\"", vec![])
		.await
		.unwrap();
	let result = env.loader(true).load_from_path(&out).await.unwrap();
	assert_eq!(result.loaded_object_count, 3);
	assert_eq!(env.headlines().await.len(), 3);
}

#[rstest]
#[tokio::test]
async fn test_dumpdata_unknown_label(#[future] env: Env) {
	let env = env.await;
	let command = DumpDataCommand::new(env.conn.clone(), env.apps.clone());
	for label in ["shop", "news.Comment"] {
		let result = command
			.execute(
				DumpDataArgs {
					labels: vec![label.to_string()],
				},
				DumpDataOptions::new(),
			)
			.await;
		assert!(result.is_err(), "{} should be rejected", label);
	}
}

#[rstest]
#[tokio::test]
async fn test_loaddata_command(#[future] env: Env) {
	let env = env.await;
	let options = LoadDataOptions::new()
		.with_verbosity(0)
		.with_fixture_dirs(vec![env.root_path.join("news/fixtures")]);
	let result = LoadDataCommand::new(env.conn.clone(), env.apps.clone())
		.execute(LoadDataArgs::new(["fixture2.json"]), options)
		.await
		.unwrap();
	assert_eq!(result.fixture_count, 1);
	let stored = env
		.conn
		.fetch_one(
			"SELECT \"pub_date\" FROM \"news_article\" WHERE \"id\" = ?",
			vec![QueryValue::Int(4)],
		)
		.await
		.unwrap();
	assert_eq!(
		stored.get::<String>("pub_date").unwrap(),
		"2006-06-16 15:00:00"
	);
}
