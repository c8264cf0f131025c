use helpdex::{markdown, Corpus, DocumentIndex, SearchEngine};

fn main() {
    println!("=== Helpdex Basic Usage Example ===\n");

    // Build an in-memory corpus (normally loaded from a directory
    // with Corpus::load_dir).
    let corpus = Corpus::from_entries(vec![
        (
            "help/getting-started.md".to_string(),
            "# Getting Started\nInstall the desktop app and sign in with your team account.\n\nSee the billing guide for plan details.\n".to_string(),
        ),
        (
            "help/billing.md".to_string(),
            "撰寫人: 王小明\n閱讀時間（分鐘）: 3\n# Billing Guide\nPlans renew monthly.\n\n- Starter\n- Team\n1. Pick a plan\n".to_string(),
        ),
        (
            "help/操作說明.md".to_string(),
            "# 操作說明\n這是測試內容 test 文字\n".to_string(),
        ),
    ]);

    let engine = SearchEngine::new(DocumentIndex::new(corpus));

    // Example 1: List all documents
    println!("--- Example 1: Document listing ---");
    for doc in engine.index().list_documents() {
        println!("  {} -> {}", doc.id, doc.title);
    }

    // Example 2: Ranked search
    println!("\n--- Example 2: Search for 'plan' ---");
    for result in engine.search("plan") {
        println!("\n[Score: {:.1}] {}", result.score, result.document.title);
        for m in &result.matches {
            println!("  line {}: {}", m.line, m.text);
            if !m.context.is_empty() {
                println!("  context: {}", m.context);
            }
        }
    }

    // Example 3: CJK content with a latin query
    println!("\n--- Example 3: Search for 'test' ---");
    for result in engine.search("test") {
        println!("[Score: {:.1}] {}", result.score, result.document.title);
    }

    // Example 4: Render a document
    println!("\n--- Example 4: Render the billing guide ---");
    let content = engine.index().get_content("help/billing.md");
    let parsed = markdown::parse(&content);
    println!("author: {:?}", parsed.frontmatter.author);
    println!("read time: {:?} minutes", parsed.frontmatter.read_time_minutes);
    println!("excerpt: {}", parsed.excerpt);
    println!("html:\n{}", parsed.html_content);

    println!("\n=== Example Complete ===");
}
