//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Duration;
use quill_core::{
  Classify as _, ErrorKind,
  article::{ArticlePatch, NewArticle},
  comment::NewComment,
  interaction::{Interaction, MarkKind},
  listing::PageRequest,
  store::{ArticleQuery, BlogStore},
  user::{NewUser, Role, UserId, UserPatch},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> UserId {
  s.create_user(NewUser {
    username:      name.into(),
    password_hash: "$argon2id$test".into(),
    email:         format!("{name}@example.com"),
  })
  .await
  .unwrap()
  .id
}

fn article(title: &str, category: &str, tags: &[&str]) -> NewArticle {
  NewArticle {
    title:    title.into(),
    summary:  format!("about {title}"),
    content:  "body".into(),
    cover:    String::new(),
    category: category.into(),
    tags:     tags.iter().map(|t| t.to_string()).collect(),
  }
}

fn comment(article_id: i64, content: &str, parent_id: Option<i64>) -> NewComment {
  NewComment { article_id, content: content.into(), parent_id }
}

// ─── Articles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_starts_with_zero_counters() {
  let s = store().await;
  let a = s.create_article(1, article("Hello", "Tech", &["Go"])).await.unwrap();
  assert!(a.id > 0);

  let found = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!(found, a);
  assert_eq!((found.view_count, found.like_count, found.comment_count), (0, 0, 0));
  assert_eq!(found.tags, ["Go"]);
}

#[tokio::test]
async fn create_requires_title_content_and_category() {
  let s = store().await;
  let err = s
    .create_article(1, article("", "Tech", &[]))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);

  let err = s.create_article(1, article("t", "", &[])).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn get_counts_each_view() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();

  assert_eq!(s.get_article(a.id).await.unwrap().view_count, 1);
  assert_eq!(s.get_article(a.id).await.unwrap().view_count, 2);
  // find does not count a view
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().view_count, 2);
}

#[tokio::test]
async fn missing_article_is_not_found() {
  let s = store().await;
  let err = s.get_article(404).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(quill_core::Error::ArticleNotFound(404))
  ));
  assert!(s.find_article(404).await.unwrap().is_none());
  assert_eq!(s.delete_article(404).await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(
    s.update_article(404, ArticlePatch::default())
      .await
      .unwrap_err()
      .kind(),
    ErrorKind::NotFound
  );
}

#[tokio::test]
async fn list_filters_and_paginates() {
  let s = store().await;
  s.create_article(1, article("Rust intro", "Tech", &["Backend"]))
    .await
    .unwrap();
  s.create_article(1, article("Hiking", "Life", &["Outdoors"]))
    .await
    .unwrap();
  s.create_article(1, article("Vue tips", "Tech", &["Vue", "Frontend"]))
    .await
    .unwrap();
  s.create_article(1, article("Vuex state", "Tech", &["Vuex"]))
    .await
    .unwrap();

  let all = s.list_articles(ArticleQuery::default()).await.unwrap();
  assert_eq!(all.total, 4);
  let titles: Vec<_> = all.items.iter().map(|a| a.title.as_str()).collect();
  assert_eq!(titles, ["Vuex state", "Vue tips", "Hiking", "Rust intro"]);

  let tech = s
    .list_articles(ArticleQuery { category: Some("Tech".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(tech.total, 3);

  // Tag filtering is a substring match over the stored tag list.
  let vue = s
    .list_articles(ArticleQuery { tag: Some("Vue".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(vue.total, 2);

  let by_summary = s
    .list_articles(ArticleQuery { keyword: Some("about Hik".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_summary.total, 1);
  assert_eq!(by_summary.items[0].title, "Hiking");

  let combined = s
    .list_articles(ArticleQuery {
      category: Some("Tech".into()),
      keyword: Some("Rust".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(combined.total, 1);

  let second = s
    .list_articles(ArticleQuery {
      page: PageRequest { page: 2, page_size: 3 },
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(second.total, 4);
  assert_eq!(second.items.len(), 1);
  assert_eq!(second.items[0].title, "Rust intro");
  assert_eq!((second.page, second.page_size), (2, 3));

  let beyond = s
    .list_articles(ArticleQuery {
      page: PageRequest { page: 9, page_size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(beyond.items.is_empty());
  assert_eq!(beyond.total, 4);
}

#[tokio::test]
async fn like_wildcards_pass_through_filters() {
  let s = store().await;
  s.create_article(1, article("Rust intro", "Tech", &["Backend"]))
    .await
    .unwrap();
  s.create_article(1, article("Hiking", "Life", &["Outdoors"]))
    .await
    .unwrap();

  let underscore = s
    .list_articles(ArticleQuery { keyword: Some("R_st".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(underscore.total, 1);
  assert_eq!(underscore.items[0].title, "Rust intro");

  let percent = s
    .list_articles(ArticleQuery { tag: Some("%".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(percent.total, 2);
}

#[tokio::test]
async fn recommend_orders_by_views_then_id() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();
  let b = s.create_article(1, article("B", "Tech", &[])).await.unwrap();
  let c = s.create_article(1, article("C", "Tech", &[])).await.unwrap();

  for _ in 0..3 {
    s.get_article(b.id).await.unwrap();
  }
  s.get_article(c.id).await.unwrap();

  let ids: Vec<_> = s
    .recommend_articles(5)
    .await
    .unwrap()
    .iter()
    .map(|a| a.id)
    .collect();
  assert_eq!(ids, [b.id, c.id, a.id]);

  assert_eq!(s.recommend_articles(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn archive_groups_by_creation_month() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();
  let b = s.create_article(1, article("B", "Life", &[])).await.unwrap();

  let archive = s.archive().await.unwrap();
  let total: usize = archive.values().map(Vec::len).sum();
  assert_eq!(total, 2);

  let bucket = &archive[&quill_core::listing::month_key(&a.created_at)];
  let ids: Vec<_> = bucket.iter().map(|x| x.id).collect();
  assert!(ids.contains(&a.id) && ids.contains(&b.id));
}

#[tokio::test]
async fn update_overwrites_only_supplied_fields() {
  let s = store().await;
  let a = s
    .create_article(1, article("Old", "Tech", &["Go"]))
    .await
    .unwrap();

  let updated = s
    .update_article(a.id, ArticlePatch {
      title: Some("New".into()),
      summary: Some(String::new()),
      tags: Some(vec!["Rust".into()]),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.title, "New");
  assert_eq!(updated.summary, a.summary);
  assert_eq!(updated.category, "Tech");
  assert_eq!(updated.tags, ["Rust"]);
  assert_eq!(updated.created_at, a.created_at);
  assert!(updated.updated_at >= a.updated_at);
}

#[tokio::test]
async fn delete_leaves_marks_and_comments() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();
  s.toggle_mark(MarkKind::Like, alice, a.id).await.unwrap();
  s.add_comment(alice, comment(a.id, "hi", None)).await.unwrap();

  s.delete_article(a.id).await.unwrap();
  assert!(s.find_article(a.id).await.unwrap().is_none());

  // The comment rows are still there.
  let threads = s.list_comments(a.id).await.unwrap();
  assert_eq!(threads.len(), 1);
}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn defaults_are_seeded_once() {
  let s = store().await;
  let categories = s.list_categories().await.unwrap();
  let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, quill_core::taxonomy::DEFAULT_CATEGORIES);

  let tags = s.list_tags().await.unwrap();
  assert_eq!(tags.len(), quill_core::taxonomy::DEFAULT_TAGS.len());
}

#[tokio::test]
async fn reopening_a_file_does_not_duplicate_seeds() {
  let path = std::env::temp_dir().join(format!("quill-test-{}.db", uuid::Uuid::new_v4()));
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_article(1, article("A", "Tech", &[])).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(
    s.list_categories().await.unwrap().len(),
    quill_core::taxonomy::DEFAULT_CATEGORIES.len()
  );
  assert_eq!(s.list_articles(ArticleQuery::default()).await.unwrap().total, 1);
  drop(s);
  let _ = std::fs::remove_file(&path);
}

// ─── Interaction ledger ──────────────────────────────────────────────────────

#[tokio::test]
async fn like_toggles_mark_and_counter() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();

  assert!(s.toggle_mark(MarkKind::Like, 7, a.id).await.unwrap());
  let after_on = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!(after_on.like_count, 1);
  assert!(s.interaction(7, a.id).await.unwrap().liked);

  assert!(!s.toggle_mark(MarkKind::Like, 7, a.id).await.unwrap());
  let after_off = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!(after_off.like_count, 0);
  assert!(!s.interaction(7, a.id).await.unwrap().liked);
}

#[tokio::test]
async fn likes_from_different_users_accumulate() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();
  for u in 1..=3 {
    s.toggle_mark(MarkKind::Like, u, a.id).await.unwrap();
  }
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().like_count, 3);
}

#[tokio::test]
async fn collect_leaves_counters_alone() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();

  assert!(s.toggle_mark(MarkKind::Collect, 7, a.id).await.unwrap());
  let found = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!((found.view_count, found.like_count, found.comment_count), (0, 0, 0));
  assert_eq!(
    s.interaction(7, a.id).await.unwrap(),
    Interaction { liked: false, collected: true }
  );

  assert!(!s.toggle_mark(MarkKind::Collect, 7, a.id).await.unwrap());
  assert_eq!(s.interaction(7, a.id).await.unwrap(), Interaction::default());
}

#[tokio::test]
async fn marks_on_missing_article_are_not_found() {
  let s = store().await;
  let err = s.toggle_mark(MarkKind::Like, 1, 99).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = s.interaction(1, 99).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Comment thread ──────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_snapshots_author_and_counts() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  s.update_user(alice, UserPatch { avatar: Some("a.png".into()), ..Default::default() })
    .await
    .unwrap();
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();

  let c = s.add_comment(alice, comment(a.id, "first", None)).await.unwrap();
  assert_eq!(c.username, "alice");
  assert_eq!(c.avatar, "a.png");
  assert!(c.is_root());
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);

  // Later profile changes do not touch the snapshot.
  s.update_user(alice, UserPatch { avatar: Some("b.png".into()), ..Default::default() })
    .await
    .unwrap();
  let threads = s.list_comments(a.id).await.unwrap();
  assert_eq!(threads[0].comment.avatar, "a.png");
}

#[tokio::test]
async fn reply_names_parent_author() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();

  let root = s.add_comment(alice, comment(a.id, "root", None)).await.unwrap();
  let reply = s
    .add_comment(bob, comment(a.id, "reply", Some(root.id)))
    .await
    .unwrap();
  assert_eq!(reply.parent_id, Some(root.id));
  assert_eq!(reply.reply_to.as_deref(), Some("alice"));

  // A reply to a reply attaches to the root and names the reply's author.
  let nested = s
    .add_comment(alice, comment(a.id, "nested", Some(reply.id)))
    .await
    .unwrap();
  assert_eq!(nested.parent_id, Some(root.id));
  assert_eq!(nested.reply_to.as_deref(), Some("bob"));

  let threads = s.list_comments(a.id).await.unwrap();
  assert_eq!(threads.len(), 1);
  let kids: Vec<_> = threads[0].children.iter().map(|c| c.id).collect();
  assert_eq!(kids, [reply.id, nested.id]);
}

#[tokio::test]
async fn missing_parent_is_tolerated() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();

  let c = s
    .add_comment(alice, comment(a.id, "into the void", Some(999)))
    .await
    .unwrap();
  assert_eq!(c.parent_id, Some(999));
  assert!(c.reply_to.is_none());
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);
  // Not visible: its parent is not a live root.
  assert!(s.list_comments(a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_across_articles_is_rejected() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();
  let b = s.create_article(alice, article("B", "Tech", &[])).await.unwrap();
  let root = s.add_comment(alice, comment(a.id, "root", None)).await.unwrap();

  let err = s
    .add_comment(alice, comment(b.id, "stray", Some(root.id)))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert_eq!(s.find_article(b.id).await.unwrap().unwrap().comment_count, 0);
}

#[tokio::test]
async fn comment_rejections() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();

  let err = s.add_comment(alice, comment(a.id, "  ", None)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);

  let err = s.add_comment(alice, comment(999, "hi", None)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let err = s.add_comment(12345, comment(a.id, "hi", None)).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(quill_core::Error::UserNotFound(12345))
  ));
}

#[tokio::test]
async fn delete_comment_checks_owner() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();
  let c = s.add_comment(alice, comment(a.id, "mine", None)).await.unwrap();

  let err = s.delete_comment(c.id, bob).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);

  s.delete_comment(c.id, alice).await.unwrap();
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 0);

  let err = s.delete_comment(c.id, alice).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn deleting_root_hides_its_replies() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = s.create_article(alice, article("A", "Tech", &[])).await.unwrap();
  let root = s.add_comment(alice, comment(a.id, "root", None)).await.unwrap();
  s.add_comment(alice, comment(a.id, "reply", Some(root.id)))
    .await
    .unwrap();

  s.delete_comment(root.id, alice).await.unwrap();
  assert!(s.list_comments(a.id).await.unwrap().is_empty());
  // Only the root's own row is discounted.
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn reader_journey() {
  let s = store().await;
  let author = user(&s, "author").await;
  let reader = user(&s, "reader").await;

  let a = s
    .create_article(author, article("Intro", "Tech", &["Go"]))
    .await
    .unwrap();

  let read = s.get_article(a.id).await.unwrap();
  assert_eq!(read.view_count, 1);

  assert!(s.toggle_mark(MarkKind::Like, reader, a.id).await.unwrap());
  let root = s
    .add_comment(reader, comment(a.id, "Nice", None))
    .await
    .unwrap();
  let reply = s
    .add_comment(author, comment(a.id, "Thanks", Some(root.id)))
    .await
    .unwrap();
  assert_eq!(reply.reply_to.as_deref(), Some("reader"));

  let now = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!((now.view_count, now.like_count, now.comment_count), (1, 1, 2));

  let threads = s.list_comments(a.id).await.unwrap();
  assert_eq!(threads.len(), 1);
  assert_eq!(threads[0].children.len(), 1);

  assert!(!s.toggle_mark(MarkKind::Like, reader, a.id).await.unwrap());
  s.delete_comment(reply.id, author).await.unwrap();
  let end = s.find_article(a.id).await.unwrap().unwrap();
  assert_eq!((end.like_count, end.comment_count), (0, 1));
}

#[tokio::test]
async fn views_likes_and_an_orphaned_reply() {
  let s = store().await;
  let u1 = user(&s, "u1").await;
  let u2 = user(&s, "u2").await;
  let u3 = user(&s, "u3").await;

  let a = s.create_article(u1, article("T", "Tech", &[])).await.unwrap();
  assert_eq!(s.get_article(a.id).await.unwrap().view_count, 1);
  assert_eq!(s.get_article(a.id).await.unwrap().view_count, 2);

  s.toggle_mark(MarkKind::Like, u1, a.id).await.unwrap();
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().like_count, 1);
  s.toggle_mark(MarkKind::Like, u1, a.id).await.unwrap();
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().like_count, 0);

  let root = s.add_comment(u2, comment(a.id, "hi", None)).await.unwrap();
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);
  let reply = s
    .add_comment(u3, comment(a.id, "hello", Some(root.id)))
    .await
    .unwrap();

  let threads = s.list_comments(a.id).await.unwrap();
  assert_eq!(threads[0].children, [reply.clone()]);
  assert_eq!(reply.reply_to.as_deref(), Some("u2"));
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 2);

  let err = s.delete_comment(root.id, u3).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  s.delete_comment(root.id, u2).await.unwrap();
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().comment_count, 1);
  assert!(s.list_comments(a.id).await.unwrap().is_empty());
}

// ─── Users and sessions ──────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_username_conflicts() {
  let s = store().await;
  user(&s, "alice").await;
  let err = s
    .create_user(NewUser {
      username:      "alice".into(),
      password_hash: "x".into(),
      email:         "other@example.com".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn new_user_defaults() {
  let s = store().await;
  let id = user(&s, "alice").await;
  let u = s.get_user(id).await.unwrap().unwrap();
  assert_eq!(u.nickname, "alice");
  assert_eq!(u.role, Role::User);
  assert_eq!(u.password_hash, "$argon2id$test");

  let by_name = s.user_by_username("alice".into()).await.unwrap().unwrap();
  assert_eq!(by_name.id, id);
  assert!(s.user_by_username("nobody".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn profile_and_password_updates() {
  let s = store().await;
  let id = user(&s, "alice").await;

  let u = s
    .update_user(id, UserPatch {
      nickname: Some("Al".into()),
      email: Some(String::new()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(u.nickname, "Al");
  assert_eq!(u.email, "alice@example.com");

  s.set_password_hash(id, "$argon2id$new".into()).await.unwrap();
  assert_eq!(s.get_user(id).await.unwrap().unwrap().password_hash, "$argon2id$new");

  assert_eq!(
    s.set_password_hash(999, "x".into()).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
}

#[tokio::test]
async fn set_role_promotes_named_user() {
  let s = store().await;
  let id = user(&s, "alice").await;
  assert!(s.set_role("alice".into(), Role::Admin).await.unwrap());
  assert_eq!(s.get_user(id).await.unwrap().unwrap().role, Role::Admin);
  assert!(!s.set_role("ghost".into(), Role::Admin).await.unwrap());
}

#[tokio::test]
async fn sessions_resolve_until_revoked() {
  let s = store().await;
  let id = user(&s, "alice").await;

  let token = s.create_session(id, Duration::hours(1)).await.unwrap();
  let who = s.resolve_session(token.clone()).await.unwrap().unwrap();
  assert_eq!(who.user_id, id);
  assert_eq!(who.username, "alice");

  assert!(s.resolve_session("bogus".into()).await.unwrap().is_none());

  s.revoke_session(token.clone()).await.unwrap();
  assert!(s.resolve_session(token).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_sessions_do_not_resolve() {
  let s = store().await;
  let id = user(&s, "alice").await;
  let token = s.create_session(id, Duration::seconds(-1)).await.unwrap();
  assert!(s.resolve_session(token).await.unwrap().is_none());
}

#[tokio::test]
async fn new_sessions_sweep_expired_ones() {
  let s = store().await;
  let id = user(&s, "alice").await;

  s.create_session(id, Duration::seconds(-1)).await.unwrap();
  s.create_session(id, Duration::seconds(-1)).await.unwrap();
  let live = s.create_session(id, Duration::hours(1)).await.unwrap();

  assert_eq!(s.session_count().await.unwrap(), 1);
  assert!(s.resolve_session(live).await.unwrap().is_some());
}

#[tokio::test]
async fn unbounded_ttl_still_resolves() {
  let s = store().await;
  let id = user(&s, "alice").await;
  let token = s.create_session(id, Duration::MAX).await.unwrap();
  assert_eq!(s.resolve_session(token).await.unwrap().unwrap().user_id, id);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_views_are_all_counted() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();

  let handles: Vec<_> = (0..50)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.get_article(a.id).await.unwrap().view_count })
    })
    .collect();

  let mut seen = Vec::new();
  for h in handles {
    seen.push(h.await.unwrap());
  }
  seen.sort_unstable();
  assert_eq!(seen, (1..=50).collect::<Vec<_>>());
  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().view_count, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_keep_count_consistent() {
  let s = store().await;
  let a = s.create_article(1, article("A", "Tech", &[])).await.unwrap();

  // Each of 20 users toggles three times: net one like each.
  let handles: Vec<_> = (1..=20)
    .flat_map(|u| {
      let s = s.clone();
      (0..3).map(move |_| {
        let s = s.clone();
        tokio::spawn(async move { s.toggle_mark(MarkKind::Like, u, a.id).await.unwrap() })
      })
    })
    .collect();
  for h in handles {
    h.await.unwrap();
  }

  assert_eq!(s.find_article(a.id).await.unwrap().unwrap().like_count, 20);
  for u in 1..=20 {
    assert!(s.interaction(u, a.id).await.unwrap().liked);
  }
}
