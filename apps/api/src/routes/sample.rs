use axum::Json;
use serde::Serialize;

/// Stand-in resume used when a client asks for sample text instead of
/// supplying its own (the demo file-upload and profile-link flows).
pub const SAMPLE_RESUME_TEXT: &str = r#"John Doe
Senior Software Engineer
New York, NY | (123) 456-7890 | john.doe@email.com | linkedin.com/in/johndoe

Summary
Innovative and results-driven Senior Software Engineer with over 8 years of experience in developing scalable web applications. Proficient in React, Node.js, and cloud-native technologies. Proven ability to lead projects from conception to completion and mentor junior developers.

Experience
Tech Solutions Inc. - New York, NY
Senior Software Engineer, June 2018 - Present
- Led the development of a high-traffic e-commerce platform using a MERN stack (MongoDB, Express, React, Node.js).
- Architected and implemented a microservices-based backend on AWS, utilizing Lambda, API Gateway, and DynamoDB.
- Improved application performance by 30% through code optimization and implementing server-side rendering with Next.js.
- Integrated Stripe API for payment processing and managed CI/CD pipelines with Jenkins and Docker.

Web Innovators - San Francisco, CA
Software Engineer, May 2015 - June 2018
- Developed and maintained responsive user interfaces using React and Redux.
- Collaborated with UX/UI designers to translate wireframes into functional components.
- Wrote unit and integration tests using Jest and Enzyme, achieving 90% code coverage.

Education
University of Technology
Bachelor of Science in Computer Science, 2011 - 2015

Skills
- Languages: JavaScript (ES6+), TypeScript, Python
- Frontend: React, Redux, Next.js, HTML5, CSS3, Tailwind CSS
- Backend: Node.js, Express.js
- Databases: MongoDB, PostgreSQL, DynamoDB
- Cloud/DevOps: AWS (Lambda, S3, EC2), Docker, Jenkins, Git
- Testing: Jest, Enzyme, Cypress"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResumeResponse {
    pub resume_text: &'static str,
}

/// GET /api/v1/resume/sample
pub async fn sample_resume_handler() -> Json<SampleResumeResponse> {
    Json(SampleResumeResponse {
        resume_text: SAMPLE_RESUME_TEXT,
    })
}
