use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gray_matter::engine::YAML;
use gray_matter::{Matter, Pod};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

const REQUIRED_FRONTMATTER: [&str; 5] = ["title", "date", "tags", "draft", "summary"];

/// Import markdown blog posts into a sac-web instance through its admin API.
#[derive(Parser, Debug)]
#[command(name = "sac-import", version)]
struct Cli {
    /// Root directory of the posts; slugs are paths relative to it.
    #[arg(default_value = "data/blog")]
    root: PathBuf,

    /// Base URL of the sac-web server.
    #[arg(long, env = "SAC_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Admin service token.
    #[arg(long, env = "SAC_SERVICE_TOKEN", default_value = "")]
    token: String,

    /// Print what would be imported without contacting the server.
    #[arg(long)]
    dry_run: bool,
}

/// Frontmatter keys understood by the importer. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: String,
    date: Option<YamlScalar>,
    #[serde(default)]
    lastmod: Option<YamlScalar>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    images: Option<OneOrMany>,
    #[serde(default)]
    img_width: Option<u32>,
    #[serde(default)]
    img_height: Option<u32>,
    #[serde(default)]
    authors: Option<Vec<String>>,
    #[serde(default)]
    draft: Option<bool>,
    #[serde(default)]
    archived: Option<bool>,
}

/// Dates may be quoted or bare in frontmatter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YamlScalar {
    Text(String),
    Number(i64),
}

impl YamlScalar {
    fn into_string(self) -> String {
        match self {
            YamlScalar::Text(s) => s,
            YamlScalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Request body of `POST /api/admin/articles`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ImportArticle {
    slug: String,
    title: String,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lastmod: Option<String>,
    tags: Vec<String>,
    summary: String,
    content: String,
    images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    img_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    img_height: Option<u32>,
    authors: Vec<String>,
    draft: bool,
    archived: bool,
}

/// Every `.md` / `.mdx` file under `root`, in a stable order.
fn discover_posts(root: &Path) -> Vec<PathBuf> {
    let mut posts: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("md" | "mdx")))
        .collect();
    posts.sort();
    posts
}

/// `root/2024/02/15/cometa.mdx` becomes `2024/02/15/cometa`.
fn derive_slug(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?
        .with_extension("");
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(segments.join("/"))
}

fn parse_post(slug: &str, source: &str) -> Result<ImportArticle> {
    let parsed = Matter::<YAML>::new().parse(source);
    let data = parsed
        .data
        .filter(|pod| !matches!(pod, Pod::Null))
        .with_context(|| format!("{slug}: missing frontmatter block"))?;

    let raw: serde_json::Value = data
        .deserialize()
        .with_context(|| format!("{slug}: invalid frontmatter"))?;
    let fields = raw
        .as_object()
        .with_context(|| format!("{slug}: frontmatter is not a mapping"))?;
    for field in REQUIRED_FRONTMATTER {
        if !fields.contains_key(field) {
            bail!("Missing required frontmatter field \"{field}\" in {slug}");
        }
    }

    let fm: FrontMatter = serde_json::from_value(raw)
        .with_context(|| format!("{slug}: unexpected frontmatter types"))?;
    let body = parsed.content;

    let date = fm
        .date
        .map(YamlScalar::into_string)
        .filter(|d| !d.trim().is_empty())
        .with_context(|| format!("{slug}: empty date"))?;

    let images = match fm.images {
        Some(OneOrMany::One(image)) => vec![image],
        Some(OneOrMany::Many(images)) => images,
        None => Vec::new(),
    };

    Ok(ImportArticle {
        slug: slug.to_string(),
        title: fm.title,
        date,
        lastmod: fm.lastmod.map(YamlScalar::into_string),
        tags: fm.tags.unwrap_or_default(),
        summary: fm.summary.unwrap_or_default(),
        content: body.trim_start_matches(['\r', '\n']).to_string(),
        images: images.into_iter().filter(|i| !i.is_empty()).collect(),
        img_width: fm.img_width,
        img_height: fm.img_height,
        authors: fm.authors.unwrap_or_default(),
        draft: fm.draft.unwrap_or(false),
        archived: fm.archived.unwrap_or(false),
    })
}

enum Outcome {
    Created,
    Exists,
}

async fn upload(
    client: &reqwest::Client,
    server: &str,
    token: &str,
    article: &ImportArticle,
) -> Result<Outcome> {
    let url = format!("{}/api/admin/articles", server.trim_end_matches('/'));
    let response = client
        .post(&url)
        .bearer_auth(token)
        .json(article)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    match response.status() {
        s if s.is_success() => Ok(Outcome::Created),
        StatusCode::CONFLICT => Ok(Outcome::Exists),
        status => {
            let body = response.text().await.unwrap_or_default();
            bail!("{}: server answered {status}: {body}", article.slug)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.root.is_dir() {
        bail!("{} is not a directory", cli.root.display());
    }

    let paths = discover_posts(&cli.root);
    println!("Found {} posts under {}", paths.len(), cli.root.display());

    let mut articles = Vec::with_capacity(paths.len());
    for path in &paths {
        let slug = derive_slug(&cli.root, path)?;
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        articles.push(parse_post(&slug, &source)?);
    }

    if cli.dry_run {
        for article in &articles {
            let state = if article.draft { "draft" } else { "published" };
            println!("  would import /blog/{} ({state}): {}", article.slug, article.title);
        }
        println!("Dry run: {} articles, nothing uploaded", articles.len());
        return Ok(());
    }

    if cli.token.is_empty() {
        bail!("--token (or SAC_SERVICE_TOKEN) is required unless --dry-run is set");
    }

    let client = reqwest::Client::new();
    let (mut created, mut skipped, mut failed) = (0usize, 0usize, 0usize);
    for article in &articles {
        match upload(&client, &cli.server, &cli.token, article).await {
            Ok(Outcome::Created) => {
                created += 1;
                println!("  imported {}", article.slug);
            }
            Ok(Outcome::Exists) => {
                skipped += 1;
                println!("  skipped {} (already exists)", article.slug);
            }
            Err(e) => {
                failed += 1;
                eprintln!("  failed: {e:#}");
            }
        }
    }

    println!("Imported {created}, skipped {skipped}, failed {failed}");
    if failed > 0 {
        bail!("{failed} articles failed to import");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const POST: &str = "---\ntitle: 'Cometa Leonard'\ndate: '2021-12-12'\ntags: [cometa, observacion]\ndraft: false\nsummary: Un cometa visible\nimages: /static/images/blog/leonard.jpg\nauthors: [default]\n---\n\n# Cometa\n\nTexto.\n";

    #[test]
    fn test_discover_and_derive_slug() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2021/12/12");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("cometa-leonard.mdx"), POST).unwrap();
        fs::write(dir.path().join("telescopios.md"), POST).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let posts = discover_posts(dir.path());
        let slugs: Vec<String> = posts
            .iter()
            .map(|p| derive_slug(dir.path(), p).unwrap())
            .collect();
        assert_eq!(slugs, vec!["2021/12/12/cometa-leonard", "telescopios"]);
    }

    #[test]
    fn test_parse_post() {
        let article = parse_post("2021/12/12/cometa-leonard", POST).unwrap();
        assert_eq!(article.title, "Cometa Leonard");
        assert_eq!(article.date, "2021-12-12");
        assert_eq!(article.tags, vec!["cometa", "observacion"]);
        assert_eq!(article.images, vec!["/static/images/blog/leonard.jpg"]);
        assert_eq!(article.content.trim_end(), "# Cometa\n\nTexto.");
        assert!(!article.draft);

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["slug"], "2021/12/12/cometa-leonard");
        assert!(json.get("imgWidth").is_none());
    }

    #[test]
    fn test_missing_required_field() {
        let source = "---\ntitle: Sin fecha\ntags: []\ndraft: true\nsummary: ''\n---\nbody";
        let err = parse_post("x", source).unwrap_err();
        assert!(err.to_string().contains("\"date\""));
    }

    #[test]
    fn test_missing_frontmatter_block() {
        assert!(parse_post("x", "# Solo texto").is_err());
        assert!(parse_post("x", "---\n---\n# Vacio").is_err());
    }

    #[test]
    fn test_frontmatter_scalars_and_folded_text() {
        let source = "---\ntitle: 'Luna: fases'\ndate: 2024-01-10\ntags: [luna]\ndraft: false\nsummary: >\n  Las fases\n  de la luna\nimages: /static/luna.png\nimgWidth: 800\n---\n\nTexto";
        let article = parse_post("luna", source).unwrap();
        assert_eq!(article.title, "Luna: fases");
        assert_eq!(article.date, "2024-01-10");
        assert_eq!(article.summary.trim_end(), "Las fases de la luna");
        assert_eq!(article.images, vec!["/static/luna.png"]);
        assert_eq!(article.img_width, Some(800));
        assert_eq!(article.content.trim(), "Texto");
    }
}
