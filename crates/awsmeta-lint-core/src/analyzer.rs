//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, ConfigError};
use crate::context::{CheckContext, ModuleContext, ParseError, SourceFile};
use crate::patterns::{self, PatternCache, PatternError, ReferenceData, ReferenceError};
use crate::rule::{CheckError, Rule, RuleBox};
use crate::sink::{CollectingSink, IssueSink, LimitedSink};
use crate::types::LintResult;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the directory tree.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Error parsing a Terraform file.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Reference data could not be loaded.
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    /// Patterns could not be compiled.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// A rule failed.
    #[error("Rule {rule} failed in {}: {source}", module.display())]
    Check {
        /// Name of the failing rule.
        rule: &'static str,
        /// Directory of the module under check.
        module: PathBuf,
        /// Underlying failure.
        #[source]
        source: CheckError,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: Option<bool>,
    max_issues: Option<usize>,
    reference: Option<Box<dyn ReferenceData>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors, overriding the configuration.
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = Some(fail);
        self
    }

    /// Stops analysis after `max` issues, overriding the configuration.
    #[must_use]
    pub fn max_issues(mut self, max: usize) -> Self {
        self.max_issues = Some(max);
        self
    }

    /// Uses `data` instead of the reference data named by the configuration.
    #[must_use]
    pub fn reference_data(mut self, data: Box<dyn ReferenceData>) -> Self {
        self.reference = Some(data);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is unavailable, an exclude
    /// pattern is invalid, or the built-in reference table is malformed.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        if exclude_patterns.is_empty() {
            exclude_patterns.push("**/.terraform/**".to_string());
        }
        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let reference = match self.reference {
            Some(data) => data,
            None => patterns::from_config(&config.reference, &root)?,
        };

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns,
            excludes,
            fail_on_parse_error: self
                .fail_on_parse_error
                .unwrap_or(config.analyzer.fail_on_parse_error),
            max_issues: self.max_issues.or(config.analyzer.max_issues),
            respect_gitignore: config.analyzer.respect_gitignore,
            patterns: PatternCache::new(reference),
            config,
        })
    }
}

enum Flow {
    Continue,
    Stop,
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    excludes: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
    max_issues: Option<usize>,
    respect_gitignore: bool,
    patterns: PatternCache,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the pattern cache shared by all checks.
    #[must_use]
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Analyzes every module under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, the reference data is unusable,
    /// a rule fails, or a file does not parse while `fail_on_parse_error` is
    /// set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        // Surface unusable reference data even when there is nothing to check.
        self.patterns.patterns()?;

        let files = self.discover_files()?;
        let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for path in files {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            by_dir.entry(dir).or_default().push(path);
        }
        info!("Found {} modules to analyze", by_dir.len());

        let mut result = LintResult::new();
        let mut sink = self.sink();

        for (dir, paths) in &by_dir {
            let module = self.load_module(dir, paths)?;
            result.files_checked += module.files().len();
            if let Flow::Stop = self.run_rules(&module, &mut sink)? {
                result.truncated = true;
                break;
            }
        }

        result.issues = sink.into_inner().into_issues();
        result.sort();

        info!(
            "Analysis complete: {} issues in {} files",
            result.issues.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every rule against an already parsed module.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule fails.
    pub fn check_module(&self, module: &ModuleContext) -> Result<LintResult, AnalyzerError> {
        let mut sink = self.sink();
        let truncated = matches!(self.run_rules(module, &mut sink)?, Flow::Stop);
        let mut result = LintResult {
            issues: sink.into_inner().into_issues(),
            files_checked: module.files().len(),
            truncated,
        };
        result.sort();
        Ok(result)
    }

    fn sink(&self) -> LimitedSink<CollectingSink> {
        LimitedSink::new(CollectingSink::new(), self.max_issues.unwrap_or(usize::MAX))
    }

    fn run_rules(
        &self,
        module: &ModuleContext,
        sink: &mut dyn IssueSink,
    ) -> Result<Flow, AnalyzerError> {
        for rule in &self.rules {
            if self.config.rule_enabled(rule.name()) == Some(false) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let severity = self
                .config
                .rule_severity(rule.name())
                .unwrap_or_else(|| rule.default_severity());
            let ctx = CheckContext::new(module, &self.patterns, severity);

            match rule.check(&ctx, sink) {
                Ok(()) => {}
                Err(CheckError::Sink(e)) => {
                    warn!("{e}; stopping analysis");
                    return Ok(Flow::Stop);
                }
                Err(source) => {
                    return Err(AnalyzerError::Check {
                        rule: rule.name(),
                        module: module.dir().to_path_buf(),
                        source,
                    })
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Reads and parses the files of one directory.
    fn load_module(&self, dir: &Path, paths: &[PathBuf]) -> Result<ModuleContext, AnalyzerError> {
        let mut module = ModuleContext::new(self.relative(dir));
        for path in paths {
            debug!("Parsing: {}", path.display());
            let content = std::fs::read_to_string(path)?;
            match SourceFile::parse(self.relative(path), content) {
                Ok(file) => module.push(file),
                Err(e) => {
                    warn!("Failed to parse {}: {}", e.path.display(), e.message);
                    if self.fail_on_parse_error {
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(module)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }

    /// Discovers all Terraform files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let respect = self.respect_gitignore;
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .ignore(respect)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git");

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("tf") {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        if self
            .excludes
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(&relative))
        {
            return true;
        }

        // Directory patterns like "**/.terraform/**" also match at the root.
        let relative = relative.to_string_lossy();
        self.exclude_patterns.iter().any(|pattern| {
            let clean = pattern.replace("**/", "").replace("/**", "");
            !clean.is_empty()
                && !clean.contains('*')
                && relative
                    .split(['/', '\\'])
                    .any(|component| component == clean)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CheckContext;
    use crate::emit::Emitter;
    use crate::engine::{self, CheckPlan, Family, Scope, ValueShape};
    use crate::patterns::ReferenceTable;
    use crate::sink::IssueSink;
    use crate::types::Severity;
    use std::fs;

    struct ArnRule;

    const PLAN: CheckPlan = CheckPlan {
        scope: Scope::WholeTree,
        shape: ValueShape::ArnPrefixed,
        families: &[Family::RegionInArn, Family::PartitionInArn],
        subject: None,
    };

    impl Rule for ArnRule {
        fn name(&self) -> &'static str {
            "arn-rule"
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
            engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
        }
    }

    const HARDCODED: &str = "resource \"aws_sns_topic_subscription\" \"s\" {\n  topic_arn = \"arn:aws:sns:us-west-2:123456789012:my-topic\"\n}\n";

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/.terraform/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/project")
            .exclude("**/.terraform/**")
            .exclude("**/fixtures/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/project/.terraform/modules/vpc/main.tf")));
        assert!(analyzer.should_exclude(Path::new("/project/env/fixtures/main.tf")));
        assert!(!analyzer.should_exclude(Path::new("/project/main.tf")));
    }

    #[test]
    fn analyzes_modules_and_skips_excluded_dirs() {
        let dir = project(&[
            ("main.tf", HARDCODED),
            ("modules/sns/main.tf", HARDCODED),
            (".terraform/modules/x/main.tf", HARDCODED),
            ("README.md", "arn:aws:sns:us-west-2:123456789012:my-topic"),
        ]);
        let result = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.issues.len(), 4);
        assert!(!result.truncated);
        assert_eq!(result.issues[0].range.file, PathBuf::from("main.tf"));
        assert_eq!(result.issues[0].range.start.line, 2);
    }

    #[test]
    fn parse_errors_are_skipped_unless_fatal() {
        let dir = project(&[("main.tf", HARDCODED), ("broken.tf", "resource \"x\" {")]);

        let result = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.issues.len(), 2);

        let err = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .fail_on_parse_error(true)
            .build()
            .unwrap()
            .analyze()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse(_)));
    }

    #[test]
    fn issue_limit_truncates() {
        let dir = project(&[("a.tf", HARDCODED), ("b.tf", HARDCODED)]);
        let result = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .max_issues(3)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert_eq!(result.issues.len(), 3);
        assert!(result.truncated);
    }

    #[test]
    fn severity_override_and_disable() {
        let dir = project(&[("main.tf", HARDCODED)]);

        let config = Config::parse("[rules.arn-rule]\nseverity = \"error\"\n").unwrap();
        let result = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .config(config)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert!(result.issues.iter().all(|i| i.severity == Severity::Error));

        let config = Config::parse("[rules.arn-rule]\nenabled = false\n").unwrap();
        let result = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .config(config)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert!(result.issues.is_empty());
    }

    #[test]
    fn empty_reference_data_aborts() {
        let dir = project(&[("main.tf", HARDCODED)]);
        let err = Analyzer::builder()
            .root(dir.path())
            .rule(ArnRule)
            .reference_data(Box::new(ReferenceTable::new(
                Vec::new(),
                vec!["aws".to_string()],
                vec!["amazonaws.com".to_string()],
            )))
            .build()
            .unwrap()
            .analyze()
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::Pattern(PatternError::Reference(ReferenceError::Empty(_)))
        ));
    }

    #[test]
    fn check_module_runs_rules_in_memory() {
        let module = ModuleContext::from_sources([("main.tf", HARDCODED)]).unwrap();
        let analyzer = Analyzer::builder().rule(ArnRule).build().unwrap();
        let result = analyzer.check_module(&module).unwrap();
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.files_checked, 1);
    }
}
