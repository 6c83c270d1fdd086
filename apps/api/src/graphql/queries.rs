//! Operation documents. Field selections mirror what the pages render.

pub const FIND_POSITION: &str = r#"
query ($fields: findPositionInput!) {
  findPosition(fields: $fields) {
    _id
    name
    status
    whoYouAre
    whatTheJobInvolves
    company {
      _id
      name
      slug
      type
      imageUrl
      description
      benefits
      employeesNumber
      tags
      whatsToLove
      mission
      funding {
        name
        date
        amount
      }
      values
      founders
      glassdoor
    }
    questionsToAsk {
      bestAnswer
      question {
        _id
        content
      }
    }
    positionsRequirements {
      roleDescription
      benefits
    }
    generalDetails {
      yearlySalary {
        min
        max
      }
      contractType
      officePolicy
      officeLocation
    }
    candidates {
      submitted
      scoreCardTotal {
        score
      }
      user {
        _id
      }
    }
  }
}
"#;

pub const FIND_PROJECT: &str = r#"
query ($fields: findProjectInput!) {
  findProject(fields: $fields) {
    _id
    title
    description
    emoji
    role {
      _id
      title
      description
      hoursPerWeek
      openPositions
      budget {
        perHour
        token
        totalBudget
      }
    }
  }
}
"#;

pub const FIND_MEMBER: &str = r#"
query ($fields: findMemberInput!) {
  findMember(fields: $fields) {
    _id
    discordName
    conduct {
      email
      telegramChatID
    }
    projects {
      phase
      info {
        _id
        title
        description
        emoji
        role {
          _id
          title
        }
      }
    }
  }
}
"#;

pub const UPDATE_MEMBER: &str = r#"
mutation ($fields: updateMemberInput!) {
  updateMember(fields: $fields) {
    _id
    discordName
  }
}
"#;

pub const SUBMIT_CANDIDATE_POSITION: &str = r#"
mutation SubmitCandidatePosition($fields: submitCandidatePositionInput) {
  submitCandidatePosition(fields: $fields) {
    _id
    name
  }
}
"#;

pub const SAVE_JOB_POST: &str = r#"
mutation (
  $fieldsCompany: updateCompanyDetailsInput!
  $fieldsPosition: updatePositionInput!
  $fieldsPositionDetails: updatePositionGeneralDetailsInput!
) {
  updateCompanyDetails(fields: $fieldsCompany) {
    _id
    name
    slug
    description
  }
  updatePosition(fields: $fieldsPosition) {
    _id
    status
    whoYouAre
    whatTheJobInvolves
  }
  updatePositionGeneralDetails(fields: $fieldsPositionDetails) {
    _id
  }
}
"#;
