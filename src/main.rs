use board_client::api::HttpTransport;
use board_client::board::{
  Article,
  ArticleId,
  ArticleStore,
  ClientState,
  Comment,
  CommentId,
  FixedUser,
  LogReporter,
  SortOrder,
  UserId
};
use board_client::config::Config;
use board_client::utils::text_utils::excerpt;
use color_eyre::Result;
use dotenv::dotenv;
use eyre::eyre;
use getopts::Options;
use log::{debug, warn};
use std::env;
use std::rc::Rc;

// How much of article and comment bodies gets printed:
const EXCERPT_LENGTH: usize = 100;

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} -a ARTICLE_ID [options]", program);
  print!("{}", opts.usage(&brief));
}

fn print_comment(comment: &Comment, depth: usize) {
  let indent = "  ".repeat(depth + 1);
  // The self vote is unknown when the sync failed.
  let self_vote = comment.self_vote()
    .map(|v| v.to_string())
    .unwrap_or_else(|| String::from("?"));
  println!(
    "{}#{} by {} ({} bp / {} gp, {} replies, your vote {}): {}",
    indent,
    comment.id(),
    comment.author_id(),
    comment.bp_count(),
    comment.gp_count(),
    comment.replies_count(),
    self_vote,
    excerpt(comment.content(), EXCERPT_LENGTH)
  );
}

fn print_article(article: &Article) {
  println!("{} [{}]", article.title(), article.id());
  println!(
    "by {} - {} bp / {} gp - {} comments - your vote {} - sorted by {}",
    article.posted_by(),
    article.bp_count(),
    article.gp_count(),
    article.comments_count(),
    article.self_vote(),
    article.sort_order()
  );
  println!("{}", excerpt(article.content(), EXCERPT_LENGTH));
  println!();
  for comment in article.comments() {
    print_comment(comment, 0);
    for reply in article.replies(comment.id()) {
      print_comment(reply, 1);
    }
  }
}

/**
 * Small CLI showing an article and its comment tree,
 * mostly useful to poke at the API.
 */
#[actix_web::main]
async fn main() -> Result<()> {
  dotenv().ok();
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("a", "article", "Id of the article to show", "ID");
  opts.optopt(
    "s",
    "sort",
    "Comment order: oldest, newest, most-downvoted, most-upvoted or most-replied",
    "ORDER"
  );
  opts.optopt("p", "pages", "Amount of comment pages to fetch (default 1)", "N");
  opts.optflag("r", "replies", "Also fetch the first page of replies of each comment");
  opts.optopt("u", "user", "Act as this user id", "ID");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }
  let article_id = match opt_matches.opt_str("a") {
    Some(id) => ArticleId::from(id),
    None => {
      print_usage(&program, opts);
      return Err(eyre!("An article id is required"));
    }
  };

  let config = Config::from_env()?;
  debug!("Current config: {:?}", config);
  let sort_order: SortOrder = match opt_matches.opt_str("s")
    .unwrap_or_else(|| config.default_sort.clone())
    .parse() {
      Ok(order) => order,
      Err(e) => return Err(eyre!(e))
    };
  let pages: usize = match opt_matches.opt_str("p") {
    Some(pages) => match pages.parse() {
      Ok(pages) => pages,
      Err(e) => return Err(eyre!("Invalid amount of pages: {} - {}", pages, e))
    },
    None => 1
  };
  let user = opt_matches.opt_str("u")
    .or_else(|| config.user_id.clone())
    .map(UserId::from);

  let state = Rc::new(ClientState::new(
    Box::new(HttpTransport::new(&config.api_root, config.timeout())),
    Box::new(FixedUser(user)),
    Box::new(LogReporter)
  ));
  let mut store = ArticleStore::new(state);
  let article = store.get_article_by_id(&article_id).await?;
  article.set_sort_order(sort_order);

  for _ in 0..pages {
    match article.fetch_comments().await {
      Ok(fetched) if fetched.is_empty() => break,
      Ok(_) => (),
      Err(e) => {
        warn!("Stopping at {} comments - {}", article.comments().count(), e);
        break;
      }
    }
  }

  if opt_matches.opt_present("r") {
    let threads: Vec<CommentId> = article.comments()
      .filter(|comment| comment.replies_count() > 0)
      .map(|comment| comment.id().clone())
      .collect();
    for id in threads {
      if let Some(mut comment) = article.comment_mut(&id) {
        if let Err(e) = comment.fetch_replies().await {
          warn!("Could not fetch replies for comment {} - {}", id, e);
        }
      }
    }
  }

  print_article(article);
  Ok(())
}
