//! Built-in ignore patterns
//!
//! Lockfiles, dependency and build directories, VCS metadata, env files and
//! OS junk that rarely belong in an LLM context.

pub const DEFAULT_IGNORES: &[&str] = &[
    // Node.js
    "node_modules",
    "package-lock.json",
    "npm-debug.log",
    // Yarn
    "yarn.lock",
    "yarn-error.log",
    // pnpm
    "pnpm-lock.yaml",
    // Bun
    "bun.lockb",
    // Deno
    "deno.lock",
    // PHP (Composer)
    "vendor",
    "composer.lock",
    // Python
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".Python",
    "pip-log.txt",
    "pip-delete-this-directory.txt",
    ".venv",
    "venv",
    "ENV",
    "env",
    // Godot
    ".godot",
    "*.import",
    // Ruby
    "Gemfile.lock",
    ".bundle",
    // Java / Rust build output
    "target",
    "*.class",
    // Gradle
    ".gradle",
    "build",
    // Maven
    "pom.xml.tag",
    "pom.xml.releaseBackup",
    "pom.xml.versionsBackup",
    "pom.xml.next",
    // .NET
    "bin",
    "obj",
    "*.suo",
    "*.user",
    // Go
    "go.sum",
    // Rust
    "Cargo.lock",
    // VCS
    ".git",
    ".svn",
    ".hg",
    // OS
    ".DS_Store",
    "Thumbs.db",
    // Environment variables
    ".env",
    ".env.local",
    ".env.development.local",
    ".env.test.local",
    ".env.production.local",
    "*.env",
    "*.env.*",
    // Framework caches
    ".svelte-kit",
    ".next",
    ".nuxt",
    ".vuepress",
    ".cache",
    "dist",
    "tmp",
    // Default output file
    "codebase.md",
    // Deploy caches
    ".turbo",
    ".vercel",
    ".netlify",
    "LICENSE",
];
