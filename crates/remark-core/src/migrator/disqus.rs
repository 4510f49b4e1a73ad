//! Disqus XML export importer

use super::Importer;
use crate::comment::{Comment, User};
use crate::error::{RemarkError, Result};
use crate::service::DataStore;
use crate::types::{CommentId, Locator};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Importer for Disqus XML exports
pub struct Disqus {
    data_store: Arc<DataStore>,
}

impl Disqus {
    pub fn new(data_store: Arc<DataStore>) -> Self {
        Self { data_store }
    }

    /// Lazily convert an export into comments, one per non-spam post
    ///
    /// Threads must precede the posts that reference them, as they do in
    /// Disqus exports.
    pub fn convert<R: BufRead>(reader: R, site_id: &str) -> DisqusComments<R> {
        DisqusComments::new(reader, site_id)
    }

    /// Import, calling `progress` with the running count after each stored comment
    ///
    /// The site is written in bulk mode; comments stored before a parse error
    /// are still flushed.
    pub fn import_with_progress(
        &self,
        reader: &mut dyn BufRead,
        site_id: &str,
        progress: &mut dyn FnMut(usize),
    ) -> Result<usize> {
        let started = Instant::now();
        self.data_store.begin_bulk(site_id);
        let stored = self.store_all(reader, site_id, progress);
        let flushed = self.data_store.end_bulk(site_id);

        let (imported, failed, skipped) = stored?;
        flushed?;
        info!(
            "imported {} comments to site {} in {:?}, {} failed, {} skipped",
            imported,
            site_id,
            started.elapsed(),
            failed,
            skipped
        );
        Ok(imported)
    }

    /// Create every converted comment, returning imported, failed and skipped counts
    fn store_all(
        &self,
        reader: &mut dyn BufRead,
        site_id: &str,
        progress: &mut dyn FnMut(usize),
    ) -> Result<(usize, usize, usize)> {
        let mut comments = Self::convert(reader, site_id);
        let mut imported = 0;
        let mut failed = 0;

        for comment in comments.by_ref() {
            let comment = comment.map_err(|e| {
                e.with_context(format!("failed to convert disqus export for site {}", site_id))
            })?;
            let id = comment.id.clone();
            match self.data_store.create(comment) {
                Ok(_) => {
                    imported += 1;
                    progress(imported);
                }
                Err(e) => {
                    warn!("failed to save comment {}: {}", id, e);
                    failed += 1;
                }
            }
        }

        Ok((imported, failed, comments.skipped()))
    }
}

impl Importer for Disqus {
    fn import(&self, reader: &mut dyn BufRead, site_id: &str) -> Result<usize> {
        self.import_with_progress(reader, site_id, &mut |_| {})
    }

    fn format_name(&self) -> &str {
        "disqus"
    }
}

#[derive(Debug, Default)]
struct ThreadRecord {
    dsq_id: String,
    external_id: String,
    link: String,
}

impl ThreadRecord {
    /// Explicit identifier wins over the thread link
    fn url(&self) -> &str {
        if self.external_id.is_empty() {
            &self.link
        } else {
            &self.external_id
        }
    }
}

#[derive(Debug, Default)]
struct PostRecord {
    dsq_id: String,
    message: String,
    created_at: String,
    is_spam: bool,
    is_deleted: bool,
    author_name: String,
    author_username: String,
    ip: String,
    thread_id: String,
    parent_id: String,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Root,
    Thread,
    Post,
    PostAuthor,
    Other,
}

/// Owned view of the XML events the converter cares about
enum XmlItem {
    Start { name: String, dsq_id: Option<String> },
    Empty { name: String, dsq_id: Option<String> },
    Text(String),
    End(String),
    Eof,
    Other,
}

/// One-shot iterator over the comments of a Disqus export
pub struct DisqusComments<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    site_id: String,
    /// Thread dsq:id to page URL
    threads: HashMap<String, String>,
    path: Vec<String>,
    text: String,
    thread: Option<ThreadRecord>,
    post: Option<PostRecord>,
    seen_root: bool,
    skipped: usize,
    done: bool,
}

impl<R: BufRead> DisqusComments<R> {
    fn new(reader: R, site_id: &str) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            site_id: site_id.to_string(),
            threads: HashMap::new(),
            path: Vec::new(),
            text: String::new(),
            thread: None,
            post: None,
            seen_root: false,
            skipped: 0,
            done: false,
        }
    }

    /// Posts dropped so far (spam, deleted, or with an unknown thread)
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn start(&mut self, name: String, dsq_id: Option<String>) {
        self.text.clear();
        if self.path.is_empty() {
            self.seen_root = true;
        }
        self.reference(&name, dsq_id);
        self.path.push(name);
    }

    /// Handle elements whose payload is a dsq:id attribute
    fn reference(&mut self, name: &str, dsq_id: Option<String>) {
        let dsq_id = dsq_id.unwrap_or_default();
        match (self.path.len(), name) {
            (1, "thread") => {
                self.thread = Some(ThreadRecord {
                    dsq_id,
                    ..Default::default()
                })
            }
            (1, "post") => {
                self.post = Some(PostRecord {
                    dsq_id,
                    ..Default::default()
                })
            }
            (2, "thread") if self.path[1] == "post" => {
                if let Some(post) = self.post.as_mut() {
                    post.thread_id = dsq_id;
                }
            }
            (2, "parent") if self.path[1] == "post" => {
                if let Some(post) = self.post.as_mut() {
                    post.parent_id = dsq_id;
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: String) -> Option<Comment> {
        self.path.pop();
        let value = std::mem::take(&mut self.text).trim().to_string();

        match (self.scope(), name.as_str()) {
            (Scope::Root, "thread") => {
                if let Some(thread) = self.thread.take() {
                    self.threads
                        .insert(thread.dsq_id.clone(), thread.url().to_string());
                }
            }
            (Scope::Thread, field) => {
                if let Some(thread) = self.thread.as_mut() {
                    match field {
                        "id" => thread.external_id = value,
                        "link" => thread.link = value,
                        _ => {}
                    }
                }
            }
            (Scope::Root, "post") => {
                if let Some(post) = self.post.take() {
                    return self.finish_post(post);
                }
            }
            (Scope::Post, field) => {
                if let Some(post) = self.post.as_mut() {
                    match field {
                        "message" => post.message = value,
                        "createdAt" => post.created_at = value,
                        "isSpam" => post.is_spam = value == "true",
                        "isDeleted" => post.is_deleted = value == "true",
                        "ipAddress" => post.ip = value,
                        _ => {}
                    }
                }
            }
            (Scope::PostAuthor, field) => {
                if let Some(post) = self.post.as_mut() {
                    match field {
                        "name" => post.author_name = value,
                        "username" => post.author_username = value,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        None
    }

    /// Where the element just closed sat in the document
    fn scope(&self) -> Scope {
        match self.path.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [_] => Scope::Root,
            [_, "thread"] => Scope::Thread,
            [_, "post"] => Scope::Post,
            [_, "post", "author"] => Scope::PostAuthor,
            _ => Scope::Other,
        }
    }

    fn finish_post(&mut self, post: PostRecord) -> Option<Comment> {
        if post.is_spam || post.is_deleted {
            debug!("skip post {}, spam={} deleted={}", post.dsq_id, post.is_spam, post.is_deleted);
            self.skipped += 1;
            return None;
        }

        let Some(url) = self.threads.get(&post.thread_id) else {
            warn!("skip post {}, unknown thread {:?}", post.dsq_id, post.thread_id);
            self.skipped += 1;
            return None;
        };

        let timestamp = match DateTime::parse_from_rfc3339(&post.created_at) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                warn!("bad timestamp {:?} in post {}: {}", post.created_at, post.dsq_id, e);
                DateTime::<Utc>::default()
            }
        };

        Some(Comment {
            id: CommentId::from(post.dsq_id),
            locator: Locator::new(self.site_id.clone(), url.clone()),
            parent_id: post.parent_id,
            text: post.message,
            timestamp,
            user: User {
                id: user_id(&post.author_username, &post.author_name),
                name: post.author_name,
                ip: post.ip,
            },
            ..Default::default()
        })
    }
}

impl<R: BufRead> Iterator for DisqusComments<R> {
    type Item = Result<Comment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let item = match read_item(&mut self.reader, &mut self.buf) {
                Ok(item) => item,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            match item {
                XmlItem::Start { name, dsq_id } => self.start(name, dsq_id),
                XmlItem::Empty { name, dsq_id } => {
                    self.text.clear();
                    self.reference(&name, dsq_id);
                }
                XmlItem::Text(text) => self.text.push_str(&text),
                XmlItem::End(name) => {
                    if let Some(comment) = self.end(name) {
                        return Some(Ok(comment));
                    }
                }
                XmlItem::Eof => {
                    self.done = true;
                    if !self.seen_root {
                        return Some(Err(RemarkError::Parse(
                            "no root element in disqus export".to_string(),
                        )));
                    }
                    if !self.path.is_empty() {
                        return Some(Err(RemarkError::Parse(format!(
                            "unexpected end of document inside <{}>",
                            self.path.join("/")
                        ))));
                    }
                    return None;
                }
                XmlItem::Other => {}
            }
        }
    }
}

fn read_item<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> Result<XmlItem> {
    let item = match reader.read_event_into(buf) {
        Ok(Event::Start(e)) => XmlItem::Start {
            name: local_name(&e),
            dsq_id: dsq_id(&e)?,
        },
        Ok(Event::Empty(e)) => XmlItem::Empty {
            name: local_name(&e),
            dsq_id: dsq_id(&e)?,
        },
        Ok(Event::Text(t)) => XmlItem::Text(t.unescape().map_err(parse_error)?.into_owned()),
        Ok(Event::CData(c)) => XmlItem::Text(String::from_utf8_lossy(&c).into_owned()),
        Ok(Event::End(e)) => {
            XmlItem::End(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
        }
        Ok(Event::Eof) => XmlItem::Eof,
        Ok(_) => XmlItem::Other,
        Err(e) => {
            return Err(RemarkError::Parse(format!(
                "at position {}: {}",
                reader.buffer_position(),
                e
            )))
        }
    };
    buf.clear();
    Ok(item)
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn dsq_id(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(parse_error)?;
        if attr.key.as_ref() == b"dsq:id" {
            let value = attr.unescape_value().map_err(parse_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_error(e: impl std::fmt::Display) -> RemarkError {
    RemarkError::Parse(e.to_string())
}

/// Stable user ID from the Disqus username, or the display name for anonymous authors
fn user_id(username: &str, name: &str) -> String {
    let source = if username.is_empty() { name } else { username };
    let hash = blake3::hash(source.as_bytes());
    format!("disqus_{}", &hash.to_hex()[..40])
}
