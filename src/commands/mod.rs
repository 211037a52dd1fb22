/*!
Command handlers for the CLI

- `serve`   - Start the HTTP API
- `history` - List or print persisted chat sessions
*/

pub mod history;
pub mod serve;
