//! Static question pools and keyword tables used when the remote service is
//! unavailable.

use super::models::{Difficulty, Topic};

/// Weighted keyword tiers for one topic. Matching is case-insensitive substring.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    pub high: &'static [&'static str],
    pub medium: &'static [&'static str],
    pub low: &'static [&'static str],
}

pub const HIGH_WEIGHT: u32 = 3;
pub const MEDIUM_WEIGHT: u32 = 2;
pub const LOW_WEIGHT: u32 = 1;

const REACT_KEYWORDS: KeywordTable = KeywordTable {
    high: &["component", "state", "props", "jsx", "hook", "virtual dom", "lifecycle", "context"],
    medium: &["render", "update", "performance", "optimization", "ref", "portal", "suspense"],
    low: &["function", "class", "element", "attribute", "event", "handler"],
};

const JAVASCRIPT_KEYWORDS: KeywordTable = KeywordTable {
    high: &["closure", "prototype", "inheritance", "asynchronous", "promise", "callback", "scope"],
    medium: &["hoisting", "event loop", "garbage collection", "module", "bind", "apply"],
    low: &["variable", "function", "object", "array", "string", "number"],
};

const GENERAL_KEYWORDS: KeywordTable = KeywordTable {
    high: &["architecture", "scalability", "performance", "security", "optimization", "efficiency"],
    medium: &["design", "pattern", "structure", "implementation", "integration", "deployment"],
    low: &["system", "application", "service", "component", "feature", "functionality"],
};

pub fn keyword_table(topic: Topic) -> &'static KeywordTable {
    match topic {
        Topic::React => &REACT_KEYWORDS,
        Topic::Javascript => &JAVASCRIPT_KEYWORDS,
        Topic::General => &GENERAL_KEYWORDS,
    }
}

/// Terminal fallback when a pool has nothing unused left.
pub fn generic_question(topic: Topic) -> String {
    format!("Tell me about your experience with {} development.", topic.as_str())
}

pub fn template_pool(difficulty: Difficulty, topic: Topic) -> &'static [&'static str] {
    match (difficulty, topic) {
        (Difficulty::Easy, Topic::React) => &[
            "What is React and why would you use it?",
            "Explain the difference between functional and class components in React.",
            "What is JSX and how does it work?",
            "What are React Hooks and why are they useful?",
            "Explain the concept of props in React.",
            "What is state in React and how do you manage it?",
            "What is the virtual DOM and how does it improve performance?",
            "Explain the component lifecycle in React.",
        ],
        (Difficulty::Easy, Topic::Javascript) => &[
            "What is the difference between let, const, and var in JavaScript?",
            "Explain the concept of hoisting in JavaScript.",
            "What are arrow functions and how do they differ from regular functions?",
            "Explain the difference between == and === in JavaScript.",
            "What is a closure in JavaScript?",
            "What are template literals and how do you use them?",
            "Explain the concept of promises in JavaScript.",
            "What is the event loop in JavaScript?",
        ],
        (Difficulty::Easy, Topic::General) => &[
            "What is version control and why is it important?",
            "Explain the difference between frontend and backend development.",
            "What is REST API and how does it work?",
            "What is a database and why do we need them?",
            "Explain the concept of responsive design.",
            "What is the difference between HTTP and HTTPS?",
            "What is a web server and how does it work?",
            "Explain the concept of caching in web development.",
        ],
        (Difficulty::Medium, Topic::React) => &[
            "How does React handle state management in complex applications?",
            "Explain React Context API and when to use it.",
            "What are React Portals and when would you use them?",
            "Explain the concept of React refs and their use cases.",
            "How do you optimize React application performance?",
            "What is React.memo and how does it work?",
            "Explain the difference between useEffect and useLayoutEffect.",
            "How do you handle forms in React?",
        ],
        (Difficulty::Medium, Topic::Javascript) => &[
            "Explain the concept of prototypal inheritance in JavaScript.",
            "What is the module pattern and how do you implement it?",
            "Explain event delegation in JavaScript.",
            "What are generators and iterators in JavaScript?",
            "How does JavaScript handle asynchronous operations?",
            "Explain the concept of currying in JavaScript.",
            "What is the difference between call, apply, and bind?",
            "How do you implement inheritance in JavaScript?",
        ],
        (Difficulty::Medium, Topic::General) => &[
            "What is the difference between SQL and NoSQL databases?",
            "Explain the concept of microservices architecture.",
            "What is Docker and how does it help in development?",
            "Explain the concept of API rate limiting.",
            "What is WebSocket and how does it differ from HTTP?",
            "Explain the concept of JWT authentication.",
            "What is CORS and why do we need it?",
            "How does browser caching work?",
        ],
        (Difficulty::Hard, Topic::React) => &[
            "How would you implement a custom React hook for data fetching?",
            "Explain React Fiber architecture and reconciliation algorithm.",
            "How do you handle error boundaries in React applications?",
            "What are React concurrent features and how do they work?",
            "Explain the concept of React Suspense and lazy loading.",
            "How do you optimize bundle size in React applications?",
            "What is React Server Components and how do they work?",
            "Explain the concept of React DevTools Profiler.",
        ],
        (Difficulty::Hard, Topic::Javascript) => &[
            "Explain the concept of closures in JavaScript and provide a practical example.",
            "How does JavaScript garbage collection work?",
            "What is the event delegation pattern and when to use it?",
            "Explain the module loading process in JavaScript.",
            "How do you implement a custom bind function?",
            "What is the difference between macro tasks and micro tasks?",
            "Explain the concept of tail call optimization.",
            "How do you implement a debounce function from scratch?",
        ],
        (Difficulty::Hard, Topic::General) => &[
            "Explain the concept of distributed systems and their challenges.",
            "What is load balancing and how does it work?",
            "Explain the CAP theorem in distributed systems.",
            "What is container orchestration and why do we need it?",
            "Explain the concept of service mesh in microservices.",
            "What is serverless computing and its benefits?",
            "How does CDN (Content Delivery Network) work?",
            "Explain the concept of progressive web apps (PWA).",
        ],
    }
}
