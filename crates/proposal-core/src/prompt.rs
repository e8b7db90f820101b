//! Prompt templates sent to the text generator.

/// Build the prompt asking for a structured proposal.
pub fn proposal_prompt(title: &str, content: &str) -> String {
    format!(
        r#"You are an expert business consultant and proposal writer. Your task is to transform user-provided information into a professional, structured project proposal.

Context: Consulting firms and freelancers need to quickly generate customized project proposals. You will receive input from users and must create a comprehensive, professional proposal that can be exported to PDF/DOCX formats.

Based on the user's input, generate a structured project proposal. IMPORTANT: Return ONLY a valid JSON object with NO additional text, markdown formatting, or code blocks.

The JSON structure should be:
{{
  "title": "Project Title",
  "executiveSummary": "A compelling overview of the project...",
  "clientInformation": {{
    "name": "Client Name",
    "industry": "Industry",
    "contact": "Contact information if available"
  }},
  "projectOverview": {{
    "description": "Detailed project description",
    "objectives": ["Objective 1", "Objective 2"]
  }},
  "proposedSolution": {{
    "approach": "Technical approach description",
    "techStack": ["Technology 1", "Technology 2"],
    "deliverables": ["Deliverable 1", "Deliverable 2"]
  }},
  "projectTimeline": {{
    "duration": "Total duration",
    "phases": [
      {{"phase": "Phase 1", "duration": "2 weeks", "description": "..."}}
    ]
  }},
  "teamResources": {{
    "structure": "Team structure description",
    "keyPersonnel": ["Role 1: Description", "Role 2: Description"]
  }},
  "budgetEstimate": {{
    "total": "$X - $Y",
    "breakdown": ["Item 1: $X", "Item 2: $Y"],
    "paymentTerms": "Payment terms description"
  }},
  "successMetrics": {{
    "kpis": ["KPI 1", "KPI 2"],
    "expectedOutcomes": ["Outcome 1", "Outcome 2"]
  }},
  "termsConditions": {{
    "scope": "Project scope description",
    "assumptions": ["Assumption 1", "Assumption 2"],
    "nextSteps": ["Step 1", "Step 2"]
  }}
}}

Use professional language and ensure the proposal is persuasive and client-focused. Fill in all sections based on the user's input, inferring reasonable details where necessary.

User Input Title: {title}
User Input Content: {content}

Remember: Return ONLY the JSON object, no other text."#
    )
}

/// Build the prompt asking for form fields extracted from a description.
pub fn autofill_prompt(description: &str) -> String {
    format!(
        r#"You are an expert project analyst. Based on the following project description, generate a structured JSON response with all the relevant project details.

Project Description: "{description}"

Provide a JSON response with the following exact structure. If a field cannot be determined from the description, leave it as an empty string or provide a reasonable default:

{{
  "name": "Project manager or developer name (if mentioned, otherwise empty)",
  "clientName": "Client or company name (if mentioned, otherwise empty)",
  "clientIndustry": "Industry sector (e.g., Healthcare, Finance, E-commerce)",
  "timelineStart": "Start date in YYYY-MM-DD format (if mentioned or estimated)",
  "timelineEnd": "End date in YYYY-MM-DD format (if mentioned or estimated)",
  "budget": "Budget amount (if mentioned, otherwise empty)",
  "techStack": ["Technologies mentioned (e.g., React, Node.js, Python)"],
  "modules": ["Features or modules mentioned (e.g., Authentication, Dashboard)"],
  "tone": "Professional tone description for the project",
  "proposalType": "Type of proposal (e.g., Technical Proposal, Business Proposal)",
  "customPrompt": "Specific requirements or custom instructions mentioned",
  "latexContent": "Any mathematical or formatted content requirements",
  "goals": "Main objectives and goals of the project",
  "challenges": "Potential challenges or constraints identified",
  "description": "A refined and detailed project description",
  "title": "A suitable project title",
  "type": "Project type (e.g., Web Development, Mobile App, AI/ML)",
  "priority": "low, medium, or high based on urgency indicators"
}}

Guidelines:
- Return only valid JSON, no additional text or markdown
- Extract as much information as possible from the description
- Ensure all array fields contain relevant items
- If a timeline is mentioned, convert it to a proper date format
- Identify technologies even if not explicitly listed as a tech stack"#
    )
}
