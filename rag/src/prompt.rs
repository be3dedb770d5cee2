//! Prompt composition.

use jobmatch_search::JobSummary;
use serde::{Deserialize, Serialize};

const FULL_INSTRUCTION: &str = "Identify the best match, return its title and URL, explain why the resume matches and which required skills are missing.";
const DESCRIPTION_ONLY_INSTRUCTION: &str = "Return the best-match job description in text format";

/// What the model is asked to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// Best match with title, URL, fit rationale and missing skills.
    #[default]
    Full,
    /// Only the best-matching job description text.
    JobDescriptionOnly,
}

impl PromptMode {
    fn instruction(self) -> &'static str {
        match self {
            Self::Full => FULL_INSTRUCTION,
            Self::JobDescriptionOnly => DESCRIPTION_ONLY_INSTRUCTION,
        }
    }
}

/// Render the résumé and the retrieved jobs, in the order given, into the
/// completion prompt.
pub fn compose_prompt<'a>(
    resume: &str,
    jobs: impl IntoIterator<Item = &'a JobSummary>,
    mode: PromptMode,
) -> String {
    let mut prompt = format!("Based on the following resume:\n{resume}\n\n");
    prompt.push_str("Here are some job descriptions that match the resume:\n");
    for (rank, job) in jobs.into_iter().enumerate() {
        prompt.push_str(&job_entry(rank + 1, job));
    }
    prompt.push_str(mode.instruction());
    prompt
}

fn job_entry(rank: usize, job: &JobSummary) -> String {
    let location = job.location.where_.as_deref().unwrap_or("an unspecified location");
    format!(
        "{rank}. {} at {} in {location}\n   Job Description: {}\n   URL: {}\n\n",
        job.title, job.company.name, job.description, job.url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobmatch_search::query::{CompanyName, LocationName};
    use pretty_assertions::assert_eq;

    fn job(id: &str, title: &str, company: &str, location: Option<&str>) -> JobSummary {
        JobSummary {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} duties"),
            company: CompanyName {
                name: company.to_string(),
            },
            location: LocationName {
                where_: location.map(str::to_string),
            },
            url: format!("https://example.com/{id}"),
        }
    }

    #[test]
    fn test_full_prompt() {
        let jobs = vec![
            job("1", "Data Scientist", "Acme", Some("Sydney NSW")),
            job("2", "ML Engineer", "Globex", Some("Remote")),
        ];
        let prompt = compose_prompt("Python, SQL", &jobs, PromptMode::Full);
        assert_eq!(
            prompt,
            "Based on the following resume:\nPython, SQL\n\n\
             Here are some job descriptions that match the resume:\n\
             1. Data Scientist at Acme in Sydney NSW\n   Job Description: Data Scientist duties\n   URL: https://example.com/1\n\n\
             2. ML Engineer at Globex in Remote\n   Job Description: ML Engineer duties\n   URL: https://example.com/2\n\n\
             Identify the best match, return its title and URL, explain why the resume matches and which required skills are missing."
        );
    }

    #[test]
    fn test_description_only_instruction() {
        let jobs = vec![job("1", "Nurse", "Health", None)];
        let prompt = compose_prompt("RN", &jobs, PromptMode::JobDescriptionOnly);
        assert!(prompt.contains("1. Nurse at Health in an unspecified location\n"));
        assert!(prompt.ends_with("Return the best-match job description in text format"));
    }

    #[test]
    fn test_job_entry_numbering() {
        let entry = job_entry(12, &job("9", "Welder", "Hunter Steel", Some("Newcastle NSW")));
        assert_eq!(
            entry,
            "12. Welder at Hunter Steel in Newcastle NSW\n   Job Description: Welder duties\n   URL: https://example.com/9\n\n"
        );
    }

    #[test]
    fn test_no_jobs() {
        let prompt = compose_prompt("cv", &Vec::<JobSummary>::new(), PromptMode::Full);
        assert!(prompt.starts_with("Based on the following resume:\ncv\n\nHere are some"));
        assert!(prompt.ends_with(FULL_INSTRUCTION));
    }
}
