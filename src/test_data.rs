#![cfg(test)]

use std::path::PathBuf;

use crate::content::{Bucket, ContentRecord};
use crate::text_utils::parse_date_time;

pub const POST_DATA_MD: &str = "---
title: What I learned after 20+ years of software development
date: 2022-04-02 12:05:00.000
tags:
  - career
  - programming
featured: true
similar: [code-review, daemons]
---

How to be a great software engineer?

Someone asked me this question today and I didn’t have an answer.

<!-- more -->

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
Some day in your life, you will find that you are not. __The earlier you find that, the better.__
";

pub const POST_NO_FRONT_MATTER: &str = "# A plain note

Nothing special here.
";

/// A post record with only the fields the derivations look at.
pub fn record(slug: &str, date: &str, tags: &[&str]) -> ContentRecord {
    ContentRecord {
        input_path: PathBuf::from(format!("src/posts/{}.md", slug)),
        slug: slug.to_string(),
        url: format!("/posts/{}/", slug),
        bucket: Bucket::Posts,
        title: format!("Title of {}", slug),
        publish_date: parse_date_time(date).unwrap(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        featured: false,
        related_slugs: vec![],
        description: None,
        duration: None,
        body: format!("Body of {}\n\n<!-- more -->\n\nRest of {}\n", slug, slug),
    }
}
