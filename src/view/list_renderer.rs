use std::io;

use ramhorns::Template;

use crate::content::ContentRecord;
use crate::paginator::page_url;
use crate::text_utils::format_date_time;
use crate::view::{check_date_format, parse_template, ViewLink, ViewTag};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    title: &'a str,
    post_list: Vec<PostItem<'a>>,
    tags: Vec<ViewTag<'a>>,
    featured: Vec<ViewLink<'a>>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
    prev_url: String,
    next_url: String,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    date: String,
    time: String,
    display_date: String,
    link: &'a str,
    title: &'a str,
    summary: &'a str,
    featured: bool,
    tags: Vec<ViewTag<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: usize,
    url: String,
}

/// A post in a listing with its rendered summary.
#[derive(Clone)]
pub struct ListEntry<'a> {
    pub record: &'a ContentRecord,
    pub summary: String,
}

/// Which page of how many a listing is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageInfo {
    pub current: usize,
    pub count: usize,
}

impl PageInfo {
    pub fn single() -> Self {
        PageInfo { current: 1, count: 1 }
    }
}

pub struct ListRenderer<'a> {
    template: Template<'a>,
    date_format: String,
}

impl<'a> ListRenderer<'a> {
    pub fn new(list_tpl_src: &'a str, date_format: &str) -> io::Result<Self> {
        check_date_format(date_format)?;
        Ok(ListRenderer {
            template: parse_template("list", list_tpl_src)?,
            date_format: date_format.to_string(),
        })
    }

    pub fn render(&self, title: &str, entries: &[ListEntry], tags: &[String], featured: &[&ContentRecord], page: PageInfo) -> String {
        let post_list = entries.iter()
            .map(|entry| {
                let record = entry.record;
                let (date, time) = format_date_time(&record.publish_date);
                PostItem {
                    date,
                    time,
                    display_date: record.publish_date.format(&self.date_format).to_string(),
                    link: record.url.as_str(),
                    title: record.title.as_str(),
                    summary: entry.summary.as_str(),
                    featured: record.featured,
                    tags: record.tags.iter().map(|t| ViewTag::from(t.as_str())).collect(),
                }
            })
            .collect();

        let page_list = (1..=page.count)
            .map(|number| ViewPagination {
                current: number == page.current,
                number,
                url: page_url(number),
            })
            .collect();

        let prev_url = if page.current > 1 { page_url(page.current - 1) } else { String::new() };
        let next_url = if page.current < page.count { page_url(page.current + 1) } else { String::new() };

        self.template.render(&ListPage {
            title,
            post_list,
            tags: tags.iter().map(|t| ViewTag::from(t.as_str())).collect(),
            featured: featured.iter().map(|r| ViewLink::from(r, &self.date_format)).collect(),
            page_list,
            show_pagination: page.count > 1,
            prev_url,
            next_url,
        })
    }
}
