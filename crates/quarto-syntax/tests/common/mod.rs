// Shared helpers; each test binary uses a different subset.
#![allow(dead_code)]

use quarto_syntax::{NodeExt, SyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree, parse};
use rowan::NodeOrToken;

pub fn tree(text: &str) -> SyntaxTree {
    parse(text).unwrap()
}

/// Rule names of the top-level blocks.
pub fn block_kinds(text: &str) -> Vec<&'static str> {
    tree(text).root().children().map(|n| n.rule_name()).collect()
}

/// Nodes as `rule(children)`, tokens as their text.
pub fn outline(node: &SyntaxNode) -> String {
    let mut out = String::new();
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => {
                out.push_str(n.rule_name());
                out.push('(');
                out.push_str(&outline(&n));
                out.push(')');
            }
            NodeOrToken::Token(t) => out.push_str(t.text()),
        }
    }
    out
}

/// Outline of the first block of `text`.
pub fn first_block(text: &str) -> String {
    let tree = tree(text);
    let block = tree.root().first_child().unwrap();
    outline(&block)
}

pub fn find(tree: &SyntaxTree, kind: SyntaxKind) -> Option<SyntaxNode> {
    tree.root().descendants().find(|n| n.kind() == kind)
}

pub fn count(tree: &SyntaxTree, kind: SyntaxKind) -> usize {
    tree.root().descendants().filter(|n| n.kind() == kind).count()
}

pub fn tokens(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<SyntaxToken> {
    tree.root()
        .descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter(|t| t.kind() == kind)
        .collect()
}

/// Every node's children tile its range exactly, and the root spans the
/// whole text.
pub fn assert_tiled(tree: &SyntaxTree, text: &str) {
    assert_eq!(tree.text(), text, "tree text differs from the input");
    assert_eq!(tree.root().byte_range(), 0..text.len());
    for node in tree.root().descendants() {
        let range = node.byte_range();
        let mut offset = range.start;
        for child in node.children_with_tokens() {
            let child_range = child.text_range();
            let (start, end) = (
                usize::from(child_range.start()),
                usize::from(child_range.end()),
            );
            assert_eq!(
                start, offset,
                "gap or overlap before {:?} in {:?}",
                child, node
            );
            offset = end;
        }
        assert_eq!(offset, range.end, "children do not reach the end of {node:?}");
    }
}

/// A small deterministic generator for edit sweeps.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn below(&mut self, n: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % n.max(1)
    }
}

pub const DOCUMENT: &str = r#"---
title: "Sample"
format: html
---

# Introduction {#sec-intro}

Quarto documents mix *prose*, **code** and `inline` bits.
See @knuth84 and [the guide](https://quarto.org){.external}.

::: {.callout-note}
A note with $x^2$ math and {{< meta title >}}.

- first item
- second item
  with a continuation

  - nested item
:::

```{python}
#| echo: false
print("hi")
```

> Quoted text
> over two lines

$$
E = mc^2
$$ {#eq-energy}

```{=html}
<b>raw</b>
```

---

Final paragraph with a [span]{.smallcaps} and an ![image](a.png).
"#;
