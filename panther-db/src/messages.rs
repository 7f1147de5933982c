use crate::{
    error::{PantherDbError, PantherDbResult as Result},
    schema::{inbox_messages, inboxes, messages, students},
    users::{UserFinder, UserId},
};
use chrono::naive::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// A pseudo struct for managing inboxes. One inbox per student, ever.
pub struct Inboxes;

impl Inboxes {
    // Create the inbox of the student if it is missing, then return it.
    pub fn ensure(conn: &mut SqliteConnection, owner: &UserId) -> Result<InboxId> {
        use crate::schema::inboxes::dsl::*;
        // The unique constraint on student_id turns a second insert into a no-op
        diesel::insert_or_ignore_into(inboxes)
            .values((
                id.eq(Uuid::new_v4().to_string()),
                student_id.eq(owner.get_id()),
            ))
            .execute(conn)?;
        Ok(InboxId {
            id: inboxes
                .filter(student_id.eq(owner.get_id()))
                .select(id)
                .first::<String>(conn)?,
        })
    }

    pub fn find(conn: &mut SqliteConnection, owner: &UserId) -> Result<Option<InboxId>> {
        use crate::schema::inboxes::dsl::*;
        Ok(inboxes
            .filter(student_id.eq(owner.get_id()))
            .select(id)
            .first::<String>(conn)
            .optional()?
            .map(|x| InboxId { id: x }))
    }

    pub fn count(conn: &mut SqliteConnection, owner: &UserId) -> Result<i64> {
        use crate::schema::inboxes::dsl::*;
        Ok(inboxes
            .filter(student_id.eq(owner.get_id()))
            .count()
            .get_result(conn)?)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InboxId {
    id: String,
}

impl InboxId {
    pub fn get_id(&self) -> &str {
        &self.id
    }
}

// A psuedo struct for managing messages
pub struct Messages;

impl Messages {
    // All messages between A and B in chronological order
    pub fn get_conv(
        conn: &mut SqliteConnection,
        participant_a: &str,
        participant_b: &str,
    ) -> Result<Vec<Message>> {
        use crate::schema::messages::dsl::*;
        // ((send == A) && (recv == B)) || ((send == B) && (recv == A))
        Ok(messages
            .filter(
                (send.eq(participant_a).and(recv.eq(participant_b)))
                    .or(send.eq(participant_b).and(recv.eq(participant_a))),
            )
            .order(time_sent.asc())
            .load::<Message>(conn)?)
    }

    /// Messages delivered into the inbox of `owner`, oldest first, with the sender's contact details.
    pub fn inbox(conn: &mut SqliteConnection, owner: &UserId) -> Result<Vec<InboxEntry>> {
        let inbox = match Inboxes::find(conn, owner)? {
            Some(inbox) => inbox,
            None => return Ok(Vec::new()),
        };
        Ok(inbox_messages::table
            .inner_join(messages::table)
            .inner_join(students::table.on(students::id.eq(messages::send)))
            .filter(inbox_messages::inbox_id.eq(inbox.get_id()))
            .order(messages::time_sent.asc())
            .select((
                messages::all_columns,
                students::name,
                students::email,
                students::phone,
            ))
            .load::<(Message, String, String, String)>(conn)?
            .into_iter()
            .map(|(msg, name, email, phone)| InboxEntry {
                id: msg.id,
                sender_id: msg.send,
                sender: name,
                email,
                phone,
                content: msg.body,
                timestamp: msg.time_sent.format(TIMESTAMP_FORMAT).to_string(),
            })
            .collect())
    }

    /// Store the message and deliver it into the receiver's inbox.
    pub fn send(
        conn: &mut SqliteConnection,
        sender: &str,
        receiver: &str,
        body_provided: &str,
    ) -> Result<MessageId> {
        conn.transaction::<_, PantherDbError, _>(|c| {
            let sender = UserFinder::new(c, None)
                .id(sender)
                .first()
                .map_err(|e| match e {
                    PantherDbError::StudentNotFound => PantherDbError::SenderNotFound,
                    e => e,
                })?;
            let receiver = UserFinder::new(c, None)
                .id(receiver)
                .first()
                .map_err(|e| match e {
                    PantherDbError::StudentNotFound => PantherDbError::ReceiverNotFound,
                    e => e,
                })?;
            if body_provided.trim().is_empty() {
                return Err(PantherDbError::EmptyContent);
            }

            let msg = Message::new(sender.get_id(), receiver.get_id(), body_provided);
            let msg_id = MessageId { id: msg.id.clone() };
            diesel::insert_into(messages::table)
                .values(&msg)
                .execute(c)?;

            let inbox = Inboxes::ensure(c, &receiver)?;
            diesel::insert_into(inbox_messages::table)
                .values((
                    inbox_messages::inbox_id.eq(inbox.get_id()),
                    inbox_messages::message_id.eq(msg_id.get_id()),
                ))
                .execute(c)?;
            Ok(msg_id)
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MessageId {
    id: String,
}

impl MessageId {
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_info(&self, conn: &mut SqliteConnection) -> Result<Message> {
        use crate::schema::messages::dsl::*;
        Ok(messages.filter(id.eq(&self.id)).first::<Message>(conn)?)
    }
}

/// One row of an inbox listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboxEntry {
    pub id: String,
    pub sender_id: String,
    pub sender: String,
    pub email: String,
    pub phone: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Clone,
    PartialEq,
)]
#[diesel(table_name = messages)]
pub struct Message {
    id: String,
    send: String,
    recv: String,
    body: String,
    time_sent: NaiveDateTime,
}

impl Message {
    pub fn new<T: ToString>(sender: T, receiver: T, body: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            send: sender.to_string(),
            recv: receiver.to_string(),
            body: body.to_string(),
            time_sent: chrono::offset::Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Get a reference to the message's send.
    pub fn get_send(&self) -> &str {
        &self.send
    }

    /// Get a reference to the message's recv.
    pub fn get_recv(&self) -> &str {
        &self.recv
    }

    /// Get a reference to the message's body.
    pub fn get_body(&self) -> &str {
        &self.body
    }

    /// Get a reference to the message's time sent.
    pub fn get_time_sent(&self) -> &NaiveDateTime {
        &self.time_sent
    }
}
