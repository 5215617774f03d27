//! Content element extraction from rendered HTML.
use std::collections::HashSet;

use kuchikikiki::NodeRef;
use markup5ever::{LocalName, local_name};

use crate::{
  elements::{
    ContentElement,
    ElementData,
    ElementList,
    ExtractedContent,
    ImageData,
    LinkData,
    ListData,
  },
  utils::{self, content_hash, own_text_excluding_lists},
};

/// Extract images, links, lists and paragraphs from an HTML fragment.
///
/// Images are deduplicated by node, links by `(href, text)`, and lists and
/// paragraphs by the hash of their serialized HTML, so identical markup
/// collapses to one entry.
#[must_use]
pub fn extract_content(html: &str) -> ExtractedContent {
  if html.trim().is_empty() {
    return ExtractedContent::default();
  }

  let document = utils::parse_fragment(html);
  ExtractedContent {
    images:     extract_images(&document),
    links:      extract_links(&document),
    lists:      extract_lists(&document),
    paragraphs: extract_paragraphs(&document),
  }
}

fn attribute(node: &NodeRef, name: &str) -> Option<String> {
  node
    .as_element()
    .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

fn is_element(node: &NodeRef, names: &[LocalName]) -> bool {
  node
    .as_element()
    .is_some_and(|el| names.contains(&el.name.local))
}

fn extract_images(document: &NodeRef) -> ElementList {
  let mut seen: Vec<NodeRef> = Vec::new();
  let mut images = Vec::new();

  let Ok(matches) = document.select("img") else {
    return ElementList::default();
  };
  for img in matches {
    let node = img.as_node().clone();
    if seen.contains(&node) {
      continue;
    }
    seen.push(node.clone());

    let href = node
      .ancestors()
      .find(|ancestor| is_element(ancestor, &[local_name!("a")]))
      .and_then(|link| attribute(&link, "href"));
    let alt = attribute(&node, "alt").unwrap_or_default();

    images.push(ContentElement {
      html: node.to_string(),
      text: alt.clone(),
      data: ElementData::Image(ImageData {
        src: attribute(&node, "src").unwrap_or_default(),
        alt,
        title: attribute(&node, "title"),
        href,
      }),
    });
  }

  ElementList(images)
}

fn extract_links(document: &NodeRef) -> ElementList {
  let mut seen: HashSet<(String, String)> = HashSet::new();
  let mut links = Vec::new();

  let Ok(matches) = document.select("a[href]") else {
    return ElementList::default();
  };
  for link in matches {
    let node = link.as_node();
    let href = attribute(node, "href").unwrap_or_default();
    let text = utils::normalize_text(&node.text_contents());
    if !seen.insert((href.clone(), text.clone())) {
      continue;
    }

    links.push(ContentElement {
      html: node.to_string(),
      text: text.clone(),
      data: ElementData::Link(LinkData {
        href,
        text,
        title: attribute(node, "title"),
      }),
    });
  }

  ElementList(links)
}

fn extract_lists(document: &NodeRef) -> ElementList {
  let mut seen: HashSet<u64> = HashSet::new();
  let mut lists = Vec::new();

  let Ok(matches) = document.select("ul, ol") else {
    return ElementList::default();
  };
  for list in matches {
    let node = list.as_node();
    // Nested lists are part of their outermost list
    let list_tags = [local_name!("ul"), local_name!("ol")];
    if node
      .ancestors()
      .any(|ancestor| is_element(&ancestor, &list_tags))
    {
      continue;
    }

    let html = node.to_string();
    if !seen.insert(content_hash(&html)) {
      continue;
    }

    let items: Vec<String> = node
      .children()
      .filter(|child| is_element(child, &[local_name!("li")]))
      .map(|li| own_text_excluding_lists(&li))
      .collect();

    lists.push(ContentElement {
      html,
      text: items.join("\n"),
      data: ElementData::List(ListData {
        ordered: is_element(node, &[local_name!("ol")]),
        items,
      }),
    });
  }

  ElementList(lists)
}

fn extract_paragraphs(document: &NodeRef) -> ElementList {
  let mut seen: HashSet<u64> = HashSet::new();
  let mut paragraphs = Vec::new();

  let Ok(matches) = document.select("p") else {
    return ElementList::default();
  };
  for paragraph in matches {
    let node = paragraph.as_node();
    let html = node.to_string();
    if !seen.insert(content_hash(&html)) {
      continue;
    }

    paragraphs.push(ContentElement {
      text: utils::normalize_text(&node.text_contents()),
      html,
      data: ElementData::Paragraph,
    });
  }

  ElementList(paragraphs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Renderer;

  fn extract(markdown: &str) -> ExtractedContent {
    extract_content(&Renderer::default().render_html(markdown))
  }

  #[test]
  fn test_images_and_linked_images() {
    let content = extract(
      "![Logo](logo.png \"The logo\")\n\n[![Badge](badge.svg)](https://ci.\
       example)\n",
    );
    assert_eq!(content.images.len(), 2);

    let logo = content.images.get(0).and_then(ContentElement::as_image);
    assert_eq!(
      logo,
      Some(&ImageData {
        src:   "logo.png".to_string(),
        alt:   "Logo".to_string(),
        title: Some("The logo".to_string()),
        href:  None,
      })
    );

    let badge = content.images.get(1).and_then(ContentElement::as_image);
    assert_eq!(
      badge.and_then(|image| image.href.as_deref()),
      Some("https://ci.example")
    );
  }

  #[test]
  fn test_links_dedup_by_href_and_text() {
    let content = extract(
      "[Docs](/docs) and [Docs](/docs) but [More docs](/docs) and [Docs](/api)",
    );
    let pairs: Vec<(String, String)> = content
      .links
      .iter()
      .filter_map(ContentElement::as_link)
      .map(|link| (link.href.clone(), link.text.clone()))
      .collect();
    assert_eq!(pairs, vec![
      ("/docs".to_string(), "Docs".to_string()),
      ("/docs".to_string(), "More docs".to_string()),
      ("/api".to_string(), "Docs".to_string()),
    ]);
  }

  #[test]
  fn test_identical_lists_collapse() {
    let content =
      extract("- a\n- b\n\nbetween\n\n- a\n- b\n\ntext\n\n1. a\n2. b\n");
    assert_eq!(content.lists.len(), 2);
    let ordered = content.lists.get(1).and_then(ContentElement::as_list);
    assert_eq!(
      ordered,
      Some(&ListData {
        ordered: true,
        items:   vec!["a".to_string(), "b".to_string()],
      })
    );
  }

  #[test]
  fn test_nested_lists_belong_to_outer_list() {
    let content = extract("- parent\n  - child\n- sibling\n");
    assert_eq!(content.lists.len(), 1);
    let list = content.lists.first().and_then(ContentElement::as_list);
    assert_eq!(
      list.map(|list| list.items.clone()),
      Some(vec!["parent".to_string(), "sibling".to_string()])
    );
  }

  #[test]
  fn test_paragraphs_dedup_and_text() {
    let content = extract("Same *text*\n\nSame *text*\n\nOther\n");
    assert_eq!(content.paragraphs.len(), 2);
    assert_eq!(content.paragraphs.text(), "Same text\nOther");
  }

  #[test]
  fn test_empty_html() {
    assert_eq!(extract_content("  \n"), ExtractedContent::default());
  }
}
