//! The course catalog as published upstream.
//!
//! Only the fields needed to build a calendar are modelled, everything else in
//! the document is ignored.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// All courses of one year and language, keyed by class code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    courses: HashMap<String, Course>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Course {
    pub basic_course_information: BasicCourseInformation,
    /// The sessions in order. The 1-based position of a session is its
    /// sequence number; the catalog's own `number` field is not unique enough
    /// to identify a session and is ignored.
    #[serde(default)]
    pub schedule: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BasicCourseInformation {
    pub class_code: String,
    pub class_name: String,
}

/// One class meeting of a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    /// The date and period, e.g. `4/10[1]`.
    pub datetime: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub lecturer: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub content: String,
}

impl Catalog {
    /// Parse the catalog JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn get(&self, class_code: &str) -> Option<&Course> {
        self.courses.get(class_code)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Pick the requested courses in request order.
    ///
    /// Unknown class codes are skipped and a code requested twice is only
    /// taken once.
    pub fn select<'a, I, S>(&self, class_codes: I) -> Vec<&Course>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        let mut seen = HashSet::new();
        let mut selected = vec![];
        for class_code in class_codes {
            let class_code = class_code.as_ref();
            if !seen.insert(class_code) {
                continue;
            }
            match self.get(class_code) {
                Some(course) => selected.push(course),
                None => tracing::debug!(class_code, "class code not found in catalog"),
            }
        }
        selected
    }
}

impl FromIterator<(String, Course)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, Course)>>(iter: T) -> Self {
        Self {
            courses: iter.into_iter().collect(),
        }
    }
}

impl Course {
    pub fn class_code(&self) -> &str {
        &self.basic_course_information.class_code
    }

    pub fn class_name(&self) -> &str {
        &self.basic_course_information.class_name
    }
}
