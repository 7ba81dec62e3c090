// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Façade over credentials, presentations and status lists configured once
//! with [`BuilderOptions`].

pub mod options;
pub mod presentation_builder;
pub mod vc_builder;

pub use self::{options::BuilderOptions, presentation_builder::PresentationBuilder, vc_builder::VCBuilder};
