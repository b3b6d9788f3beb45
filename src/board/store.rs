use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;
use log::{debug, info, warn};
use super::article::Article;
use super::entities::ArticleId;
use super::error::{BoardError, Result};
use super::ClientState;

/**
 * Cache of the articles loaded so far. Whoever builds
 * the client owns it and passes it around.
 * Cached articles are served as they are forever, there
 * is no freshness check and no automatic eviction.
 * Failed loads are never cached.
 */
pub struct ArticleStore {
  state: Rc<ClientState>,
  articles: HashMap<ArticleId, Article>
}

impl ArticleStore {

  pub fn new(state: Rc<ClientState>) -> Self {
    Self {
      state,
      articles: HashMap::new()
    }
  }

  pub async fn get_article_by_id(&mut self, id: &ArticleId) -> Result<&mut Article> {
    let state = Rc::clone(&self.state);
    match self.articles.entry(id.clone()) {
      Entry::Occupied(entry) => {
        debug!("Article {} served from cache", id);
        Ok(entry.into_mut())
      },
      Entry::Vacant(entry) => {
        let article = Article::load(state, id.clone()).await
          .map_err(|e| {
            warn!("Could not load article {} - {}", id, e);
            BoardError::ArticleUnavailable(id.clone(), e.to_string())
          })?;
        info!("Article {} loaded", id);
        Ok(entry.insert(article))
      }
    }
  }

  pub fn get(&self, id: &ArticleId) -> Option<&Article> {
    self.articles.get(id)
  }

  pub fn get_mut(&mut self, id: &ArticleId) -> Option<&mut Article> {
    self.articles.get_mut(id)
  }

  pub fn contains(&self, id: &ArticleId) -> bool {
    self.articles.contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.articles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.articles.is_empty()
  }

  pub fn evict(&mut self, id: &ArticleId) -> Option<Article> {
    self.articles.remove(id)
  }

  // Deletes on the server and only then forgets about
  // the article.
  pub async fn delete_article(&mut self, id: &ArticleId) -> Result<()> {
    let article = self.articles.get(id)
      .ok_or_else(|| BoardError::ArticleUnavailable(id.clone(), String::from("not cached")))?;
    article.delete().await?;
    self.articles.remove(id);
    Ok(())
  }

}
